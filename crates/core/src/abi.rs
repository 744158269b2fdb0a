//! Ethereum ABI parser
//!
//! Parses contract ABI JSON (a bare entry array or a build artifact carrying
//! an `abi` field) into raw entry descriptions. Type strings are left
//! untouched here; [`crate::contract::ContractInfo`] turns them into the type
//! model.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use typegen_common::{Error, Result};

/// Parsed contract ABI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AbiDefinition {
    /// Contract name recorded in the artifact, if any
    pub contract_name: Option<String>,
    /// Contract constructor
    pub constructor: Option<AbiFunction>,
    /// Contract functions, in declaration order
    pub functions: Vec<AbiFunction>,
    /// Contract events, in declaration order
    pub events: Vec<AbiEvent>,
    /// Contract errors, in declaration order
    pub errors: Vec<AbiError>,
    /// Whether a fallback entry is declared
    pub has_fallback: bool,
    /// Whether a receive entry is declared
    pub has_receive: bool,
}

/// ABI function definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbiFunction {
    /// Function name
    pub name: String,
    /// Function inputs
    pub inputs: Vec<AbiParameter>,
    /// Function outputs
    pub outputs: Vec<AbiParameter>,
    /// State mutability (pure, view, nonpayable, payable)
    pub state_mutability: String,
}

/// ABI event definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbiEvent {
    /// Event name
    pub name: String,
    /// Event inputs
    pub inputs: Vec<AbiParameter>,
    /// Whether event is anonymous
    pub anonymous: bool,
}

/// ABI error definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbiError {
    /// Error name
    pub name: String,
    /// Error inputs
    pub inputs: Vec<AbiParameter>,
}

/// ABI parameter definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbiParameter {
    /// Parameter name, empty when unnamed
    pub name: String,
    /// Parameter type (e.g., uint256, address, tuple[])
    pub param_type: String,
    /// Internal type (for structs and custom types)
    pub internal_type: Option<String>,
    /// Components (for tuples and structs)
    pub components: Option<Vec<AbiParameter>>,
    /// Whether parameter is indexed (for events)
    pub indexed: bool,
}

/// Ethereum ABI parser
pub struct AbiParser;

impl AbiParser {
    /// Create a new parser instance
    pub fn new() -> Self {
        Self
    }

    /// Parse an ABI or artifact from JSON content
    pub fn parse_content(&self, content: &str) -> Result<AbiDefinition> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| Error::malformed_abi(format!("invalid JSON: {}", e)))?;
        self.parse_value(&value)
    }

    /// Parse an ABI or artifact from a JSON value
    pub fn parse_value(&self, value: &Value) -> Result<AbiDefinition> {
        match value {
            Value::Array(_) => self.parse_abi(value),
            Value::Object(object) => {
                let abi = object
                    .get("abi")
                    .ok_or_else(|| Error::malformed_abi("artifact has no 'abi' field"))?;
                let mut definition = self.parse_abi(abi)?;
                definition.contract_name = object
                    .get("contractName")
                    .and_then(|v| v.as_str())
                    .map(String::from);
                Ok(definition)
            }
            _ => Err(Error::malformed_abi(
                "ABI must be an array or an artifact object",
            )),
        }
    }

    /// Parse ABI from JSON value
    fn parse_abi(&self, value: &Value) -> Result<AbiDefinition> {
        let abi_array = value
            .as_array()
            .ok_or_else(|| Error::malformed_abi("ABI must be an array"))?;

        let mut definition = AbiDefinition::default();

        for item in abi_array {
            let item_type = item
                .get("type")
                .and_then(|v| v.as_str())
                .unwrap_or("function");

            match item_type {
                "constructor" => {
                    definition.constructor = Some(self.parse_function(item, "constructor")?);
                }
                "function" => {
                    definition.functions.push(self.parse_function(item, "function")?);
                }
                "event" => {
                    definition.events.push(self.parse_event(item)?);
                }
                "error" => {
                    definition.errors.push(self.parse_error(item)?);
                }
                "fallback" => definition.has_fallback = true,
                "receive" => definition.has_receive = true,
                other => {
                    tracing::debug!("Skipping ABI entry of unknown type '{}'", other);
                }
            }
        }

        Ok(definition)
    }

    /// Parse a function from ABI
    fn parse_function(&self, value: &Value, function_type: &str) -> Result<AbiFunction> {
        let name = match value.get("name").and_then(|v| v.as_str()) {
            Some(name) => name.to_string(),
            None if function_type == "function" => {
                return Err(Error::malformed_abi("function must have a name"))
            }
            None => function_type.to_string(),
        };

        let inputs = Self::parse_parameter_list(value, "inputs")?;
        let outputs = Self::parse_parameter_list(value, "outputs")?;

        let state_mutability = value
            .get("stateMutability")
            .and_then(|v| v.as_str())
            .unwrap_or_else(|| {
                // Legacy support
                if value.get("constant").and_then(|v| v.as_bool()).unwrap_or(false) {
                    "view"
                } else if value.get("payable").and_then(|v| v.as_bool()).unwrap_or(false) {
                    "payable"
                } else {
                    "nonpayable"
                }
            })
            .to_string();

        Ok(AbiFunction {
            name,
            inputs,
            outputs,
            state_mutability,
        })
    }

    /// Parse an event from ABI
    fn parse_event(&self, value: &Value) -> Result<AbiEvent> {
        let name = value
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::malformed_abi("event must have a name"))?
            .to_string();

        let inputs = Self::parse_parameter_list(value, "inputs")?;

        let anonymous = value
            .get("anonymous")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        Ok(AbiEvent {
            name,
            inputs,
            anonymous,
        })
    }

    /// Parse an error from ABI
    fn parse_error(&self, value: &Value) -> Result<AbiError> {
        let name = value
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::malformed_abi("error must have a name"))?
            .to_string();

        let inputs = Self::parse_parameter_list(value, "inputs")?;

        Ok(AbiError { name, inputs })
    }

    fn parse_parameter_list(value: &Value, key: &str) -> Result<Vec<AbiParameter>> {
        value
            .get(key)
            .and_then(|v| v.as_array())
            .map(|arr| Self::parse_parameters(arr))
            .transpose()
            .map(Option::unwrap_or_default)
    }

    /// Parse parameters, recursing into tuple components
    fn parse_parameters(array: &[Value]) -> Result<Vec<AbiParameter>> {
        let mut parameters = Vec::with_capacity(array.len());

        for param in array {
            let name = param
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();

            let param_type = param
                .get("type")
                .and_then(|v| v.as_str())
                .ok_or_else(|| {
                    Error::malformed_abi(format!("parameter '{}' must have a type", name))
                })?
                .to_string();

            let internal_type = param
                .get("internalType")
                .and_then(|v| v.as_str())
                .map(String::from);

            let indexed = param
                .get("indexed")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);

            let components = if param_type.starts_with("tuple") {
                param
                    .get("components")
                    .and_then(|v| v.as_array())
                    .map(|arr| Self::parse_parameters(arr))
                    .transpose()?
            } else {
                None
            };

            parameters.push(AbiParameter {
                name,
                param_type,
                internal_type,
                components,
                indexed,
            });
        }

        Ok(parameters)
    }
}

impl Default for AbiParser {
    fn default() -> Self {
        Self::new()
    }
}
