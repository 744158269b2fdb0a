//! Generation configuration
//!
//! A [`TypegenConfig`] is built once per run, validated, and then passed by
//! reference to every stage. Nothing mutates it afterwards.

use std::path::Path;

use serde::{Deserialize, Serialize};
use typegen_common::{Error, Result};


/// Main configuration for a generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypegenConfig {
    /// Directory the generated files are written to
    pub output_directory: String,
    /// Target backend identifier (e.g. `ethers-v5`)
    pub target_identifier: String,
    /// Key every function by its full signature, not only overloaded ones
    pub always_generate_overloads: bool,
    /// Add a literal contract name field to every contract type
    pub discriminate_unions_by_type: bool,
    /// Appended to struct identifiers in input form
    pub struct_input_postfix: String,
    /// Appended to struct identifiers in output form
    pub struct_output_postfix: String,
    /// Appended to every relative import path (e.g. `.js`)
    pub file_suffix: String,
    /// Emit type-only re-exports in index files
    pub type_only_barrels: bool,
    /// Artifacts outside the project that are always regenerated
    pub external_artifact_paths: Vec<String>,
    /// Overrides the target's built-in type-name table
    pub type_names: Option<TypeNames>,
}

impl Default for TypegenConfig {
    fn default() -> Self {
        Self {
            output_directory: "typechain-types".to_string(),
            target_identifier: "ethers-v5".to_string(),
            always_generate_overloads: false,
            discriminate_unions_by_type: false,
            struct_input_postfix: "Struct".to_string(),
            struct_output_postfix: "StructOutput".to_string(),
            file_suffix: String::new(),
            type_only_barrels: true,
            external_artifact_paths: Vec::new(),
            type_names: None,
        }
    }
}

impl TypegenConfig {
    /// Load configuration from a TOML file; missing keys take their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML content
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.output_directory.trim().is_empty() {
            return Err(Error::configuration("outputDirectory must not be empty"));
        }

        if self.target_identifier.trim().is_empty() {
            return Err(Error::configuration("targetIdentifier must not be empty"));
        }

        if self.struct_input_postfix.is_empty() || self.struct_output_postfix.is_empty() {
            return Err(Error::configuration("struct postfixes must not be empty"));
        }

        if self.struct_input_postfix == self.struct_output_postfix {
            return Err(Error::configuration(format!(
                "structInputPostfix and structOutputPostfix are both '{}'",
                self.struct_input_postfix
            )));
        }

        if let Some(type_names) = &self.type_names {
            type_names.validate().map_err(|e| e.within("typeNames"))?;
        }

        Ok(())
    }
}

/// Target type names for each ABI leaf, in both typing disciplines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeNames {
    /// Names used where values are accepted
    pub input: LeafNames,
    /// Names used where values are returned
    pub output: LeafNames,
    /// Type-only imports the generated files may need
    #[serde(default)]
    pub imports: Vec<TypeImport>,
}

/// Type names for leaf ABI categories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafNames {
    pub address: String,
    pub boolean: String,
    pub string: String,
    /// Fixed-size `bytesN`
    pub bytes: String,
    /// Dynamic `bytes`
    pub dynamic_bytes: String,
    /// Integer buckets, matched by the smallest `maxBits` that fits
    pub integers: Vec<IntegerBucket>,
}

/// Integer widths up to `max_bits` map to `name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegerBucket {
    pub max_bits: u16,
    pub name: String,
}

/// Names imported from a module with `import type { … } from "module"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeImport {
    pub module: String,
    pub names: Vec<String>,
}

impl TypeNames {
    /// Check that every leaf has a name and integer buckets are usable
    pub fn validate(&self) -> Result<()> {
        self.input.validate().map_err(|e| e.within("input"))?;
        self.output.validate().map_err(|e| e.within("output"))?;
        Ok(())
    }
}

impl LeafNames {
    /// Name of the integer type covering `bits`.
    ///
    /// `original_type` is only used for the diagnostic.
    pub fn integer(&self, bits: u16, original_type: &str) -> Result<&str> {
        self.integers
            .iter()
            .filter(|bucket| bucket.max_bits >= bits)
            .min_by_key(|bucket| bucket.max_bits)
            .map(|bucket| bucket.name.as_str())
            .ok_or_else(|| {
                Error::configuration(format!("no integer type name covers '{}'", original_type))
            })
    }

    fn validate(&self) -> Result<()> {
        let leaves = [
            ("address", &self.address),
            ("boolean", &self.boolean),
            ("string", &self.string),
            ("bytes", &self.bytes),
            ("dynamicBytes", &self.dynamic_bytes),
        ];
        if let Some((leaf, _)) = leaves.iter().find(|(_, name)| name.trim().is_empty()) {
            return Err(Error::configuration(format!("type name for '{}' is empty", leaf)));
        }

        if self.integers.is_empty() {
            return Err(Error::configuration("at least one integer bucket is required"));
        }
        if let Some(bucket) = self
            .integers
            .iter()
            .find(|b| b.max_bits == 0 || b.name.trim().is_empty())
        {
            return Err(Error::configuration(format!(
                "invalid integer bucket {{ maxBits: {}, name: '{}' }}",
                bucket.max_bits, bucket.name
            )));
        }

        Ok(())
    }
}
