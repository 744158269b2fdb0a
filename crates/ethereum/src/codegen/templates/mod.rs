//! Template system for declaration file generation
//!
//! Contains the Handlebars templates the target renders its files with.

use handlebars::Handlebars;
use serde::Serialize;
use typegen_core::{Error, Result};

/// Template manager for declaration file generation
pub struct TemplateManager {
    handlebars: Handlebars<'static>,
}

impl TemplateManager {
    /// Create a new template manager and register all templates
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        // Output is TypeScript, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.set_strict_mode(true);

        Self::register_templates(&mut handlebars)?;

        Ok(Self { handlebars })
    }

    /// Register all built-in templates
    fn register_templates(handlebars: &mut Handlebars) -> Result<()> {
        handlebars
            .register_template_string("contract", include_str!("contract.hbs"))
            .map_err(|e| Error::template(format!("Failed to register contract template: {}", e)))?;

        Ok(())
    }

    /// Render a template with the given data
    pub fn render<T: Serialize>(&self, template_name: &str, data: &T) -> Result<String> {
        self.handlebars.render(template_name, data).map_err(|e| {
            Error::template(format!("Failed to render template {}: {}", template_name, e))
        })
    }

    /// Get list of available templates
    pub fn available_templates(&self) -> Vec<String> {
        self.handlebars.get_templates().keys().cloned().collect()
    }
}
