//! ABI type model
//!
//! Canonical representation of ABI type trees. Every consumer matches on
//! [`EvmTypeKind`] exhaustively, so a new ABI category is a compile-time
//! update everywhere.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use typegen_common::{Error, Result};

use crate::abi::AbiParameter;
use crate::names::normalize_name;

/// A node of the ABI type tree together with the type string it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvmType {
    /// The category and its payload
    pub kind: EvmTypeKind,
    /// Original ABI type string, kept for diagnostics
    pub original_type: String,
}

/// Closed set of ABI type categories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EvmTypeKind {
    Address,
    Bool,
    String,
    Uinteger {
        bits: u16,
    },
    Integer {
        bits: u16,
    },
    Bytes {
        size: u8,
    },
    DynamicBytes,
    Array {
        element: Box<EvmType>,
        size: Option<usize>,
    },
    Tuple {
        components: Vec<NamedEvmType>,
        struct_name: Option<StructName>,
    },
}

/// A tuple component or parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEvmType {
    /// Component name, empty for positional components
    pub name: String,
    #[serde(rename = "type")]
    pub ty: EvmType,
}

/// Declared name of a struct, optionally scoped by its owner
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StructName {
    pub identifier: String,
    pub namespace: Option<String>,
}

impl StructName {
    pub fn new<S: Into<String>>(identifier: S, namespace: Option<String>) -> Self {
        Self {
            identifier: identifier.into(),
            namespace,
        }
    }

    /// Reference to a declaration named `identifier + postfix`, qualified by the namespace
    pub fn qualified(&self, postfix: &str) -> String {
        match &self.namespace {
            Some(namespace) => format!("{}.{}{}", namespace, self.identifier, postfix),
            None => format!("{}{}", self.identifier, postfix),
        }
    }
}

impl fmt::Display for StructName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified(""))
    }
}

/// A named tuple hoisted to its own declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructType {
    pub name: StructName,
    pub components: Vec<NamedEvmType>,
    pub original_type: String,
}

impl StructType {
    /// Tuple node equivalent to this struct
    pub fn as_evm_type(&self) -> EvmType {
        EvmType {
            kind: EvmTypeKind::Tuple {
                components: self.components.clone(),
                struct_name: Some(self.name.clone()),
            },
            original_type: self.original_type.clone(),
        }
    }

    /// Shape used to detect two different structs forced under one name
    pub fn shape_signature(&self) -> String {
        let fields: Vec<String> = self
            .components
            .iter()
            .map(|c| format!("{} {}", c.ty.shape_signature(), c.name))
            .collect();
        format!("({})", fields.join(","))
    }
}

impl EvmType {
    pub fn new(kind: EvmTypeKind, original_type: impl Into<String>) -> Self {
        Self {
            kind,
            original_type: original_type.into(),
        }
    }

    /// Canonical ABI spelling, as used in signatures (`(uint256,address)[]`)
    pub fn canonical(&self) -> String {
        match &self.kind {
            EvmTypeKind::Address => "address".to_string(),
            EvmTypeKind::Bool => "bool".to_string(),
            EvmTypeKind::String => "string".to_string(),
            EvmTypeKind::Uinteger { bits } => format!("uint{}", bits),
            EvmTypeKind::Integer { bits } => format!("int{}", bits),
            EvmTypeKind::Bytes { size } => format!("bytes{}", size),
            EvmTypeKind::DynamicBytes => "bytes".to_string(),
            EvmTypeKind::Array { element, size } => match size {
                Some(size) => format!("{}[{}]", element.canonical(), size),
                None => format!("{}[]", element.canonical()),
            },
            EvmTypeKind::Tuple { components, .. } => {
                let inner: Vec<String> = components.iter().map(|c| c.ty.canonical()).collect();
                format!("({})", inner.join(","))
            }
        }
    }

    /// Canonical spelling plus component names and nested struct names
    pub fn shape_signature(&self) -> String {
        match &self.kind {
            EvmTypeKind::Array { element, size } => match size {
                Some(size) => format!("{}[{}]", element.shape_signature(), size),
                None => format!("{}[]", element.shape_signature()),
            },
            EvmTypeKind::Tuple {
                components,
                struct_name,
            } => {
                let fields: Vec<String> = components
                    .iter()
                    .map(|c| format!("{} {}", c.ty.shape_signature(), c.name))
                    .collect();
                match struct_name {
                    Some(name) => format!("{}({})", name, fields.join(",")),
                    None => format!("({})", fields.join(",")),
                }
            }
            _ => self.canonical(),
        }
    }

    /// The struct this node declares, if it is a named tuple
    pub fn as_struct(&self) -> Option<StructType> {
        match &self.kind {
            EvmTypeKind::Tuple {
                components,
                struct_name: Some(name),
            } => Some(StructType {
                name: name.clone(),
                components: components.clone(),
                original_type: self.original_type.clone(),
            }),
            _ => None,
        }
    }
}

fn array_suffix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.+)\[(\d*)\]$").expect("valid array regex"))
}

fn sized_type_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(uint|int|bytes)(\d+)$").expect("valid sized type regex"))
}

/// Parse an ABI type string into the type model.
///
/// `components` must be present for `tuple` based types and is ignored
/// otherwise. `internal_type` carries the Solidity struct name, when known.
pub fn parse_evm_type(
    raw_type: &str,
    components: Option<&[AbiParameter]>,
    internal_type: Option<&str>,
) -> Result<EvmType> {
    let raw_type = raw_type.trim();

    if let Some(caps) = array_suffix_regex().captures(raw_type) {
        let element_type = &caps[1];
        let size = match &caps[2] {
            "" => None,
            digits => Some(digits.parse::<u32>().map_err(|_| {
                Error::malformed_abi(format!("array size out of range in '{}'", raw_type))
            })? as usize),
        };
        if size == Some(0) {
            return Err(Error::malformed_abi(format!(
                "zero-length array '{}'",
                raw_type
            )));
        }

        let element = parse_evm_type(element_type, components, internal_type)?;
        return Ok(EvmType::new(
            EvmTypeKind::Array {
                element: Box::new(element),
                size,
            },
            raw_type,
        ));
    }

    let kind = match raw_type {
        "address" => EvmTypeKind::Address,
        "bool" => EvmTypeKind::Bool,
        "string" => EvmTypeKind::String,
        "bytes" => EvmTypeKind::DynamicBytes,
        "byte" => EvmTypeKind::Bytes { size: 1 },
        "function" => EvmTypeKind::Bytes { size: 24 },
        "uint" => EvmTypeKind::Uinteger { bits: 256 },
        "int" => EvmTypeKind::Integer { bits: 256 },
        "tuple" => {
            let components = components.ok_or_else(|| {
                Error::malformed_abi(format!("'{}' type without components", raw_type))
            })?;
            let components = components
                .iter()
                .map(|c| {
                    let ty = parse_evm_type(
                        &c.param_type,
                        c.components.as_deref(),
                        c.internal_type.as_deref(),
                    )?;
                    Ok(NamedEvmType {
                        name: c.name.clone(),
                        ty,
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            EvmTypeKind::Tuple {
                components,
                struct_name: internal_type.and_then(extract_struct_name),
            }
        }
        other => parse_sized_type(other)?,
    };

    Ok(EvmType::new(kind, raw_type))
}

fn parse_sized_type(raw_type: &str) -> Result<EvmTypeKind> {
    let caps = sized_type_regex()
        .captures(raw_type)
        .ok_or_else(|| Error::malformed_abi(format!("unknown type '{}'", raw_type)))?;

    let width: u16 = caps[2]
        .parse()
        .map_err(|_| Error::malformed_abi(format!("invalid width in '{}'", raw_type)))?;

    match &caps[1] {
        "bytes" => {
            if !(1..=32).contains(&width) {
                return Err(Error::malformed_abi(format!(
                    "fixed bytes size must be in 1..=32, got '{}'",
                    raw_type
                )));
            }
            Ok(EvmTypeKind::Bytes { size: width as u8 })
        }
        base => {
            if width == 0 || width > 256 || width % 8 != 0 {
                return Err(Error::malformed_abi(format!(
                    "integer width must be a multiple of 8 in 8..=256, got '{}'",
                    raw_type
                )));
            }
            if base == "uint" {
                Ok(EvmTypeKind::Uinteger { bits: width })
            } else {
                Ok(EvmTypeKind::Integer { bits: width })
            }
        }
    }
}

/// Extract `Name` / `Owner.Name` from an internal type such as `struct Owner.Name[]`
pub fn extract_struct_name(internal_type: &str) -> Option<StructName> {
    let qualified = internal_type.strip_prefix("struct ")?;
    let qualified = match qualified.find('[') {
        Some(idx) => &qualified[..idx],
        None => qualified,
    };

    let (namespace, identifier) = match qualified.rfind('.') {
        Some(idx) => (Some(qualified[..idx].to_string()), &qualified[idx + 1..]),
        None => (None, qualified),
    };

    let identifier = normalize_name(identifier).ok()?;
    Some(StructName::new(identifier, namespace))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(name: &str, ty: &str) -> AbiParameter {
        AbiParameter {
            name: name.to_string(),
            param_type: ty.to_string(),
            internal_type: None,
            components: None,
            indexed: false,
        }
    }

    #[test]
    fn test_parse_primitives() {
        let ty = parse_evm_type("uint256", None, None).unwrap();
        assert_eq!(ty.kind, EvmTypeKind::Uinteger { bits: 256 });
        assert_eq!(ty.original_type, "uint256");

        assert_eq!(
            parse_evm_type("int8", None, None).unwrap().kind,
            EvmTypeKind::Integer { bits: 8 }
        );
        assert_eq!(
            parse_evm_type("uint", None, None).unwrap().kind,
            EvmTypeKind::Uinteger { bits: 256 }
        );
        assert_eq!(
            parse_evm_type("bytes32", None, None).unwrap().kind,
            EvmTypeKind::Bytes { size: 32 }
        );
        assert_eq!(
            parse_evm_type("bytes", None, None).unwrap().kind,
            EvmTypeKind::DynamicBytes
        );
        assert_eq!(
            parse_evm_type("address", None, None).unwrap().kind,
            EvmTypeKind::Address
        );
    }

    #[test]
    fn test_parse_nested_arrays() {
        let ty = parse_evm_type("uint8[2][]", None, None).unwrap();
        match &ty.kind {
            EvmTypeKind::Array { element, size } => {
                assert_eq!(*size, None);
                assert_eq!(
                    element.kind,
                    EvmTypeKind::Array {
                        element: Box::new(EvmType::new(
                            EvmTypeKind::Uinteger { bits: 8 },
                            "uint8"
                        )),
                        size: Some(2),
                    }
                );
            }
            other => panic!("expected array, got {:?}", other),
        }
        assert_eq!(ty.canonical(), "uint8[2][]");
    }

    #[test]
    fn test_parse_rejects_invalid_widths() {
        for bad in ["uint7", "int264", "bytes0", "bytes33", "uint0", "fixed128x18", "mapping"] {
            let err = parse_evm_type(bad, None, None).unwrap_err();
            assert!(
                matches!(err, Error::MalformedAbi { .. }),
                "{} should be malformed",
                bad
            );
        }
    }

    #[test]
    fn test_parse_rejects_oversized_arrays() {
        for bad in ["uint8[18446744073709551615]", "address[4294967296][]"] {
            let err = parse_evm_type(bad, None, None).unwrap_err();
            assert!(matches!(err, Error::MalformedAbi { .. }), "{}", bad);
        }
        assert!(parse_evm_type("uint8[4294967295]", None, None).is_ok());
    }

    #[test]
    fn test_tuple_requires_components() {
        let err = parse_evm_type("tuple[]", None, None).unwrap_err();
        assert!(matches!(err, Error::MalformedAbi { .. }));
    }

    #[test]
    fn test_struct_array_keeps_struct_name_on_element() {
        let components = vec![component("target", "address"), component("callData", "bytes")];
        let ty = parse_evm_type("tuple[]", Some(&components), Some("struct Multicall.Call[]"))
            .unwrap();

        let EvmTypeKind::Array { element, size: None } = &ty.kind else {
            panic!("expected dynamic array");
        };
        let strukt = element.as_struct().expect("element is a struct");
        assert_eq!(strukt.name, StructName::new("Call", Some("Multicall".to_string())));
        assert_eq!(ty.canonical(), "(address,bytes)[]");
    }

    #[test]
    fn test_extract_struct_name() {
        assert_eq!(
            extract_struct_name("struct Vector2"),
            Some(StructName::new("Vector2", None))
        );
        assert_eq!(
            extract_struct_name("struct Lib.Inner.Point[3]"),
            Some(StructName::new("Point", Some("Lib.Inner".to_string())))
        );
        assert_eq!(extract_struct_name("tuple"), None);
        assert_eq!(extract_struct_name("contract IERC20"), None);
    }

    #[test]
    fn test_qualified_struct_reference() {
        let name = StructName::new("Call", Some("Multicall".to_string()));
        assert_eq!(name.qualified("Struct"), "Multicall.CallStruct");
        assert_eq!(
            StructName::new("Vector2", None).qualified("StructOutput"),
            "Vector2StructOutput"
        );
    }
}
