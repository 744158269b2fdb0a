//! Built-in targets and their type-name tables

use std::collections::BTreeMap;

use typegen_core::config::{IntegerBucket, LeafNames, TypeImport, TypeNames};
use typegen_core::{Error, Result, Target, TypegenConfig};

use super::EthersTarget;

/// Type names for ethers v5: `BigNumberish` in, `BigNumber`/`number` out
pub fn ethers_v5_type_names() -> TypeNames {
    TypeNames {
        input: LeafNames {
            address: "string".to_string(),
            boolean: "boolean".to_string(),
            string: "string".to_string(),
            bytes: "BytesLike".to_string(),
            dynamic_bytes: "BytesLike".to_string(),
            integers: vec![bucket(256, "BigNumberish")],
        },
        output: LeafNames {
            address: "string".to_string(),
            boolean: "boolean".to_string(),
            string: "string".to_string(),
            bytes: "string".to_string(),
            dynamic_bytes: "string".to_string(),
            // Values up to 48 bits fit a JS number
            integers: vec![bucket(48, "number"), bucket(256, "BigNumber")],
        },
        imports: vec![TypeImport {
            module: "ethers".to_string(),
            names: vec![
                "BigNumber".to_string(),
                "BigNumberish".to_string(),
                "BytesLike".to_string(),
            ],
        }],
    }
}

/// Type names for ethers v6: `bigint` replaces `BigNumber`
pub fn ethers_v6_type_names() -> TypeNames {
    TypeNames {
        input: LeafNames {
            address: "AddressLike".to_string(),
            boolean: "boolean".to_string(),
            string: "string".to_string(),
            bytes: "BytesLike".to_string(),
            dynamic_bytes: "BytesLike".to_string(),
            integers: vec![bucket(256, "BigNumberish")],
        },
        output: LeafNames {
            address: "string".to_string(),
            boolean: "boolean".to_string(),
            string: "string".to_string(),
            bytes: "string".to_string(),
            dynamic_bytes: "string".to_string(),
            integers: vec![bucket(256, "bigint")],
        },
        imports: vec![TypeImport {
            module: "ethers".to_string(),
            names: vec![
                "AddressLike".to_string(),
                "BigNumberish".to_string(),
                "BytesLike".to_string(),
            ],
        }],
    }
}

fn bucket(max_bits: u16, name: &str) -> IntegerBucket {
    IntegerBucket {
        max_bits,
        name: name.to_string(),
    }
}

/// Registry of the targets this crate can build
pub struct TargetRegistry {
    presets: BTreeMap<String, TypeNames>,
}

impl TargetRegistry {
    /// Create a registry with the built-in presets
    pub fn new() -> Self {
        let mut presets = BTreeMap::new();
        presets.insert("ethers-v5".to_string(), ethers_v5_type_names());
        presets.insert("ethers-v6".to_string(), ethers_v6_type_names());
        Self { presets }
    }

    /// Get the built-in type names of a target
    pub fn get_preset(&self, name: &str) -> Option<&TypeNames> {
        self.presets.get(name)
    }

    /// List all available targets
    pub fn list_targets(&self) -> Vec<&str> {
        self.presets.keys().map(|s| s.as_str()).collect()
    }

    /// Build the target selected by `config`.
    ///
    /// `config.type_names`, when set, replaces the preset table.
    pub fn create(&self, config: &TypegenConfig) -> Result<Box<dyn Target>> {
        let name = config.target_identifier.as_str();
        let preset = self.get_preset(name).ok_or_else(|| {
            Error::configuration(format!(
                "unknown target '{}', available targets: {}",
                name,
                self.list_targets().join(", ")
            ))
        })?;

        let type_names = config.type_names.clone().unwrap_or_else(|| preset.clone());
        let target = EthersTarget::new(name, type_names, config)?;
        Ok(Box::new(target))
    }
}

impl Default for TargetRegistry {
    fn default() -> Self {
        Self::new()
    }
}
