//! Declaration file generator for one contract
//!
//! Renders struct declarations, the function map, event and error aliases
//! and the contract type, then fills the Handlebars layout.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use typegen_core::config::TypeImport;
use typegen_core::contract::{ErrorDescription, EventDescription, FunctionDescription};
use typegen_core::{ContractInfo, Result};

use super::structs::generate_struct_types;
use super::templates::TemplateManager;
use super::types::{argument_label, TypeGenerator};

/// Switches that change the shape of the generated declarations
#[derive(Debug, Clone, Default)]
pub struct GeneratorOptions {
    /// Key every function and event by signature, not only overloaded ones
    pub always_generate_overloads: bool,
    /// Add a literal `contractName` field to the contract type
    pub discriminate_unions_by_type: bool,
    pub struct_input_postfix: String,
    pub struct_output_postfix: String,
}

#[derive(Serialize)]
struct ContractTemplateData {
    sections: Vec<String>,
}

/// Generates the declaration file contents of contracts
pub struct ContractFileGenerator<'a> {
    types: TypeGenerator<'a>,
    imports: &'a [TypeImport],
    options: &'a GeneratorOptions,
    templates: &'a TemplateManager,
}

impl<'a> ContractFileGenerator<'a> {
    pub fn new(
        types: TypeGenerator<'a>,
        imports: &'a [TypeImport],
        options: &'a GeneratorOptions,
        templates: &'a TemplateManager,
    ) -> Self {
        Self {
            types,
            imports,
            options,
            templates,
        }
    }

    /// Render the full declaration file of `contract`
    pub fn generate(&self, contract: &ContractInfo) -> Result<String> {
        let mut body = Vec::new();

        let structs = generate_struct_types(
            &contract.structs,
            &self.types,
            &self.options.struct_input_postfix,
            &self.options.struct_output_postfix,
        )?;
        if !structs.is_empty() {
            body.push(structs);
        }

        body.push(self.functions_map(contract)?);

        let events = contract
            .events
            .iter()
            .map(|event| self.event_alias(event).map_err(|e| e.within(&event.name)))
            .collect::<Result<Vec<_>>>()?;
        if !events.is_empty() {
            body.push(events.join("\n\n"));
        }
        body.push(self.events_map(contract));

        let errors = contract
            .errors
            .iter()
            .map(|error| self.error_alias(error).map_err(|e| e.within(&error.name)))
            .collect::<Result<Vec<_>>>()?;
        if !errors.is_empty() {
            body.push(errors.join("\n\n"));
        }
        body.push(self.errors_map(contract));

        body.push(self.contract_type(contract)?);

        let mut sections = Vec::with_capacity(body.len() + 1);
        if let Some(imports) = self.import_lines(&body) {
            sections.push(imports);
        }
        sections.extend(body);

        self.templates
            .render("contract", &ContractTemplateData { sections })
    }

    /// `import type` lines for the configured names the body actually uses
    fn import_lines(&self, body: &[String]) -> Option<String> {
        let used: HashSet<&str> = body
            .iter()
            .flat_map(|section| {
                section.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
            })
            .filter(|token| !token.is_empty())
            .collect();

        let lines: Vec<String> = self
            .imports
            .iter()
            .filter_map(|import| {
                let names: Vec<&str> = import
                    .names
                    .iter()
                    .map(String::as_str)
                    .filter(|name| used.contains(name))
                    .collect();
                if names.is_empty() {
                    None
                } else {
                    Some(format!(
                        "import type {{ {} }} from \"{}\";",
                        names.join(", "),
                        import.module
                    ))
                }
            })
            .collect();

        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }

    fn functions_map(&self, contract: &ContractInfo) -> Result<String> {
        let map_name = format!("{}Functions", contract.name);
        let mut entries = Vec::new();

        for function in &contract.functions {
            let entry = self
                .function_entry(function)
                .map_err(|e| e.within(&function.name))?;
            entries.push(format!("{}: {};", function.resolved_identifier, entry));
        }

        let overloaded = overloaded_names(contract.functions.iter().map(|f| f.name.as_str()));
        for function in &contract.functions {
            if self.options.always_generate_overloads || overloaded.contains(function.name.as_str())
            {
                entries.push(format!(
                    "\"{}\": {}[\"{}\"];",
                    function.signature(),
                    map_name,
                    function.resolved_identifier
                ));
            }
        }

        Ok(format!("export type {} = {};", map_name, object_block(&entries)))
    }

    fn function_entry(&self, function: &FunctionDescription) -> Result<String> {
        Ok(object_block(&[
            format!("signature: \"{}\";", function.signature()),
            format!("selector: \"{}\";", function.selector()),
            format!("stateMutability: \"{}\";", function.state_mutability),
            format!("inputs: {};", self.types.input_arguments(&function.inputs)?),
            format!("outputs: {};", self.types.output_result(&function.outputs)?),
        ]))
    }

    fn event_alias(&self, event: &EventDescription) -> Result<String> {
        let args: Vec<_> = event
            .inputs
            .iter()
            .map(|input| typegen_core::NamedEvmType {
                name: input.name.clone(),
                ty: input.ty.clone(),
            })
            .collect();

        let filter = event
            .inputs
            .iter()
            .enumerate()
            .filter(|(_, input)| input.indexed)
            .map(|(i, input)| {
                let ty = self.types.input_type(&input.ty, true)?;
                Ok(format!("{}?: {} | null", argument_label(&input.name, i), ty))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(format!(
            "export type {}Event = {};",
            event.resolved_identifier,
            object_block(&[
                format!("signature: \"{}\";", event.signature()),
                format!("topic: \"{}\";", event.topic()),
                format!("anonymous: {};", event.anonymous),
                format!("args: {};", self.types.output_complex_type(&args, true)?),
                format!("filter: [{}];", filter.join(", ")),
            ])
        ))
    }

    fn events_map(&self, contract: &ContractInfo) -> String {
        let mut entries: Vec<String> = contract
            .events
            .iter()
            .map(|e| format!("{id}: {id}Event;", id = e.resolved_identifier))
            .collect();

        let overloaded = overloaded_names(contract.events.iter().map(|e| e.name.as_str()));
        for event in &contract.events {
            if self.options.always_generate_overloads || overloaded.contains(event.name.as_str()) {
                entries.push(format!(
                    "\"{}\": {}Event;",
                    event.signature(),
                    event.resolved_identifier
                ));
            }
        }

        format!(
            "export type {}Events = {};",
            contract.name,
            object_block(&entries)
        )
    }

    fn error_alias(&self, error: &ErrorDescription) -> Result<String> {
        Ok(format!(
            "export type {}Error = {};",
            error.resolved_identifier,
            object_block(&[
                format!("signature: \"{}\";", error.signature()),
                format!("selector: \"{}\";", error.selector()),
                format!("args: {};", self.types.output_complex_type(&error.inputs, true)?),
            ])
        ))
    }

    fn errors_map(&self, contract: &ContractInfo) -> String {
        let entries: Vec<String> = contract
            .errors
            .iter()
            .map(|e| format!("{id}: {id}Error;", id = e.resolved_identifier))
            .collect();
        format!(
            "export type {}Errors = {};",
            contract.name,
            object_block(&entries)
        )
    }

    fn contract_type(&self, contract: &ContractInfo) -> Result<String> {
        let mut fields = Vec::new();
        if self.options.discriminate_unions_by_type {
            fields.push(format!("contractName: \"{}\";", contract.name));
        }

        let (mutability, inputs) = match &contract.constructor {
            Some(constructor) => (
                constructor.state_mutability.as_str(),
                self.types
                    .input_arguments(&constructor.inputs)
                    .map_err(|e| e.within("constructor"))?,
            ),
            None => ("nonpayable", "[]".to_string()),
        };
        fields.push(format!(
            "deploy: {};",
            object_block(&[
                format!("stateMutability: \"{}\";", mutability),
                format!("inputs: {};", inputs),
            ])
        ));

        fields.push(format!("functions: {}Functions;", contract.name));
        fields.push(format!("events: {}Events;", contract.name));
        fields.push(format!("errors: {}Errors;", contract.name));
        fields.push(format!("fallback: {};", contract.has_fallback));
        fields.push(format!("receive: {};", contract.has_receive));

        Ok(format!(
            "export type {} = {};",
            contract.name,
            object_block(&fields)
        ))
    }
}

/// Names declared more than once
fn overloaded_names<'n>(names: impl Iterator<Item = &'n str>) -> HashSet<&'n str> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in names {
        *counts.entry(name).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(name, _)| name)
        .collect()
}

/// `{ … }` object type with one member per line, or `{}` when empty
fn object_block(members: &[String]) -> String {
    if members.is_empty() {
        return "{}".to_string();
    }

    let body: Vec<String> = members
        .iter()
        .flat_map(|member| member.lines().map(|line| format!("  {}", line)).collect::<Vec<_>>())
        .collect();
    format!("{{\n{}\n}}", body.join("\n"))
}
