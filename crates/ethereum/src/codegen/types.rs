//! TypeScript type expressions for ABI types
//!
//! Two disciplines: the input form is the widest type a caller may pass, the
//! output form is the exact decoded shape (a positional tuple with a named
//! overlay for tuples).

use typegen_core::config::TypeNames;
use typegen_core::{EvmType, EvmTypeKind, NamedEvmType, Result};

/// Maps type-model nodes to TypeScript type expressions
#[derive(Debug, Clone, Copy)]
pub struct TypeGenerator<'a> {
    names: &'a TypeNames,
    input_postfix: &'a str,
    output_postfix: &'a str,
}

impl<'a> TypeGenerator<'a> {
    pub fn new(names: &'a TypeNames, input_postfix: &'a str, output_postfix: &'a str) -> Self {
        Self {
            names,
            input_postfix,
            output_postfix,
        }
    }

    /// Input form of `ty`.
    ///
    /// With `use_structs`, named tuples are referenced by their declared
    /// struct name instead of being spelled out.
    pub fn input_type(&self, ty: &EvmType, use_structs: bool) -> Result<String> {
        let leaves = &self.names.input;
        let generated = match &ty.kind {
            EvmTypeKind::Address => leaves.address.clone(),
            EvmTypeKind::Bool => leaves.boolean.clone(),
            EvmTypeKind::String => leaves.string.clone(),
            EvmTypeKind::Bytes { .. } => leaves.bytes.clone(),
            EvmTypeKind::DynamicBytes => leaves.dynamic_bytes.clone(),
            EvmTypeKind::Uinteger { bits } | EvmTypeKind::Integer { bits } => {
                leaves.integer(*bits, &ty.original_type)?.to_string()
            }
            EvmTypeKind::Array { element, size } => {
                let element = self.input_type(element, use_structs)?;
                array_type(&element, *size)
            }
            EvmTypeKind::Tuple {
                components,
                struct_name,
            } => match struct_name {
                Some(name) if use_structs => name.qualified(self.input_postfix),
                _ => self.input_complex_type(components, use_structs)?,
            },
        };
        Ok(generated)
    }

    /// Output form of `ty`
    pub fn output_type(&self, ty: &EvmType, use_structs: bool) -> Result<String> {
        let leaves = &self.names.output;
        let generated = match &ty.kind {
            EvmTypeKind::Address => leaves.address.clone(),
            EvmTypeKind::Bool => leaves.boolean.clone(),
            EvmTypeKind::String => leaves.string.clone(),
            EvmTypeKind::Bytes { .. } => leaves.bytes.clone(),
            EvmTypeKind::DynamicBytes => leaves.dynamic_bytes.clone(),
            EvmTypeKind::Uinteger { bits } | EvmTypeKind::Integer { bits } => {
                leaves.integer(*bits, &ty.original_type)?.to_string()
            }
            EvmTypeKind::Array { element, size } => {
                let element = self.output_type(element, use_structs)?;
                array_type(&element, *size)
            }
            EvmTypeKind::Tuple {
                components,
                struct_name,
            } => match struct_name {
                Some(name) if use_structs => name.qualified(self.output_postfix),
                _ => self.output_complex_type(components, use_structs)?,
            },
        };
        Ok(generated)
    }

    /// `{ a: A, b: B }`, or a positional tuple when a component is unnamed
    pub fn input_complex_type(
        &self,
        components: &[NamedEvmType],
        use_structs: bool,
    ) -> Result<String> {
        if components.is_empty() {
            return Ok("{}".to_string());
        }

        let types = components
            .iter()
            .map(|c| self.input_type(&c.ty, use_structs))
            .collect::<Result<Vec<_>>>()?;

        if components.iter().any(|c| c.name.is_empty()) {
            return Ok(format!("[{}]", types.join(", ")));
        }

        let fields: Vec<String> = components
            .iter()
            .zip(&types)
            .map(|(c, ty)| format!("{}: {}", c.name, ty))
            .collect();
        Ok(format!("{{ {} }}", fields.join(", ")))
    }

    /// `[A, B] & { a: A, b: B }`; unnamed components are positional only
    pub fn output_complex_type(
        &self,
        components: &[NamedEvmType],
        use_structs: bool,
    ) -> Result<String> {
        let types = components
            .iter()
            .map(|c| self.output_type(&c.ty, use_structs))
            .collect::<Result<Vec<_>>>()?;
        let positional = format!("[{}]", types.join(", "));

        let named: Vec<String> = components
            .iter()
            .zip(&types)
            .filter(|(c, _)| !c.name.is_empty())
            .map(|(c, ty)| format!("{}: {}", c.name, ty))
            .collect();

        if named.is_empty() {
            Ok(positional)
        } else {
            Ok(format!("{} & {{ {} }}", positional, named.join(", ")))
        }
    }

    /// Labelled argument list in input form: `[to: string, amount: BigNumberish]`
    pub fn input_arguments(&self, params: &[NamedEvmType]) -> Result<String> {
        let args = params
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let ty = self.input_type(&p.ty, true).map_err(|e| scoped(e, &p.name))?;
                Ok(format!("{}: {}", argument_label(&p.name, i), ty))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(format!("[{}]", args.join(", ")))
    }

    /// Return type of a call: `void`, the single output, or the dual tuple
    pub fn output_result(&self, outputs: &[NamedEvmType]) -> Result<String> {
        match outputs {
            [] => Ok("void".to_string()),
            [single] => self
                .output_type(&single.ty, true)
                .map_err(|e| scoped(e, &single.name)),
            many => self.output_complex_type(many, true),
        }
    }
}

/// Label for a positional argument; unnamed ones become `arg0`, `arg1`, …
pub fn argument_label(name: &str, index: usize) -> String {
    if name.is_empty() {
        format!("arg{}", index)
    } else {
        name.to_string()
    }
}

fn scoped(err: typegen_core::Error, name: &str) -> typegen_core::Error {
    if name.is_empty() {
        err
    } else {
        err.within(name)
    }
}

/// Fixed arrays longer than this are typed like dynamic arrays
const MAX_TUPLE_LENGTH: usize = 64;

fn array_type(element: &str, size: Option<usize>) -> String {
    match size {
        Some(size) if size <= MAX_TUPLE_LENGTH => {
            format!("[{}]", vec![element; size].join(", "))
        }
        _ if element.contains(" & ") || element.contains(" | ") => format!("({})[]", element),
        _ => format!("{}[]", element),
    }
}
