//! Code generation for ethers contract declarations
//!
//! This module turns the contract model into TypeScript declaration files
//! and tells the barrel builder how to re-export them.

pub mod generator;
pub mod registry;
pub mod structs;
pub mod templates;
pub mod types;


pub use generator::{ContractFileGenerator, GeneratorOptions};
pub use registry::TargetRegistry;
pub use templates::TemplateManager;
pub use types::TypeGenerator;

use tracing::debug;
use typegen_core::config::TypeNames;
use typegen_core::{BarrelOptions, ContractInfo, FileDescription, Result, Target, TypegenConfig};

/// Target backend for the ethers client library family
pub struct EthersTarget {
    name: String,
    type_names: TypeNames,
    options: GeneratorOptions,
    barrel: BarrelOptions,
    templates: TemplateManager,
}

impl EthersTarget {
    /// Create a target named `name` that renders with `type_names`
    pub fn new(name: &str, type_names: TypeNames, config: &TypegenConfig) -> Result<Self> {
        type_names.validate().map_err(|e| e.within(name))?;

        Ok(Self {
            name: name.to_string(),
            type_names,
            options: GeneratorOptions {
                always_generate_overloads: config.always_generate_overloads,
                discriminate_unions_by_type: config.discriminate_unions_by_type,
                struct_input_postfix: config.struct_input_postfix.clone(),
                struct_output_postfix: config.struct_output_postfix.clone(),
            },
            barrel: BarrelOptions {
                type_only: config.type_only_barrels,
                postfix: String::new(),
                module_suffix: config.file_suffix.clone(),
                ..Default::default()
            },
            templates: TemplateManager::new()?,
        })
    }
}

impl Target for EthersTarget {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports_incremental(&self) -> bool {
        true
    }

    fn generate_contract(&self, contract: &ContractInfo, path: &str) -> Result<FileDescription> {
        debug!("Rendering {} to {}", contract.name, path);

        let types = TypeGenerator::new(
            &self.type_names,
            &self.options.struct_input_postfix,
            &self.options.struct_output_postfix,
        );
        let generator = ContractFileGenerator::new(
            types,
            &self.type_names.imports,
            &self.options,
            &self.templates,
        );

        let contents = generator
            .generate(contract)
            .map_err(|e| e.within(&contract.name))?;
        Ok(FileDescription::new(path, contents))
    }

    fn barrel_options(&self) -> BarrelOptions {
        self.barrel.clone()
    }
}
