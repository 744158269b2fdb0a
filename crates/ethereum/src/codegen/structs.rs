//! Struct declarations, grouped by namespace

use typegen_core::structs::group_by_namespace;
use typegen_core::{Result, StructType};

use super::types::TypeGenerator;

/// Declare every struct in both forms.
///
/// Top-level structs come first, then one `export declare namespace` block per
/// namespace, both in first-discovery order. Returns an empty string when
/// there is nothing to declare.
pub fn generate_struct_types(
    structs: &[StructType],
    types: &TypeGenerator<'_>,
    input_postfix: &str,
    output_postfix: &str,
) -> Result<String> {
    let groups = group_by_namespace(structs);
    let mut blocks = Vec::new();

    for strukt in &groups.top_level {
        blocks.push(declare_struct(strukt, types, input_postfix, output_postfix)?);
    }

    for (namespace, members) in &groups.namespaces {
        let declarations = members
            .iter()
            .map(|s| declare_struct(s, types, input_postfix, output_postfix))
            .collect::<Result<Vec<_>>>()?;
        blocks.push(format!(
            "export declare namespace {} {{\n{}\n}}",
            namespace,
            indent(&declarations.join("\n\n"))
        ));
    }

    Ok(blocks.join("\n\n"))
}

fn declare_struct(
    strukt: &StructType,
    types: &TypeGenerator<'_>,
    input_postfix: &str,
    output_postfix: &str,
) -> Result<String> {
    let identifier = &strukt.name.identifier;
    let declare = || -> Result<String> {
        let input = types.input_complex_type(&strukt.components, true)?;
        let output = types.output_complex_type(&strukt.components, true)?;
        Ok(format!(
            "export type {id}{input_postfix} = {input};\n\nexport type {id}{output_postfix} = {output};",
            id = identifier,
        ))
    };
    declare().map_err(|e| e.within(format!("struct {}", strukt.name)))
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("  {}", line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
