//! Contract-level intermediate representation

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use typegen_common::{Error, Result};

use crate::abi::{AbiDefinition, AbiParameter};
use crate::names::{validate_struct_components, NameResolver};
use crate::structs::StructDeduplicator;
use crate::types::{parse_evm_type, EvmType, NamedEvmType, StructType};

/// A function with its resolved, collision-free identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDescription {
    pub name: String,
    pub state_mutability: String,
    pub inputs: Vec<NamedEvmType>,
    pub outputs: Vec<NamedEvmType>,
    pub resolved_identifier: String,
}

/// An event with its resolved identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDescription {
    pub name: String,
    pub inputs: Vec<EventArgument>,
    pub anonymous: bool,
    pub resolved_identifier: String,
}

/// An event input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventArgument {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: EvmType,
    pub indexed: bool,
}

/// A custom error with its resolved identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDescription {
    pub name: String,
    pub inputs: Vec<NamedEvmType>,
    pub resolved_identifier: String,
}

/// Constructor inputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorDescription {
    pub state_mutability: String,
    pub inputs: Vec<NamedEvmType>,
}

/// Everything codegen needs to know about one contract.
///
/// Built once per ABI file and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractInfo {
    pub name: String,
    pub constructor: Option<ConstructorDescription>,
    pub functions: Vec<FunctionDescription>,
    pub events: Vec<EventDescription>,
    pub errors: Vec<ErrorDescription>,
    /// Named structs reachable from any signature, in first-discovery order
    pub structs: Vec<StructType>,
    pub has_fallback: bool,
    pub has_receive: bool,
}

impl ContractInfo {
    /// Build the contract model from a parsed ABI.
    ///
    /// Errors are scoped with the contract name and the offending entry.
    pub fn from_abi(name: &str, abi: &AbiDefinition) -> Result<Self> {
        Self::build(name, abi).map_err(|e| e.within(name))
    }

    fn build(name: &str, abi: &AbiDefinition) -> Result<Self> {
        let constructor = abi
            .constructor
            .as_ref()
            .map(|c| {
                Ok::<_, Error>(ConstructorDescription {
                    state_mutability: c.state_mutability.clone(),
                    inputs: named_types(&c.inputs).map_err(|e| e.within("constructor"))?,
                })
            })
            .transpose()?;

        let function_names: Vec<&str> = abi.functions.iter().map(|f| f.name.as_str()).collect();
        let function_ids = NameResolver::new("function").resolve(&function_names)?;
        let functions = abi
            .functions
            .iter()
            .zip(function_ids)
            .map(|(f, resolved_identifier)| {
                let scope = |e: Error| e.within(&f.name);
                Ok(FunctionDescription {
                    name: f.name.clone(),
                    state_mutability: f.state_mutability.clone(),
                    inputs: named_types(&f.inputs).map_err(scope)?,
                    outputs: named_types(&f.outputs).map_err(scope)?,
                    resolved_identifier,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let event_names: Vec<&str> = abi.events.iter().map(|e| e.name.as_str()).collect();
        let event_ids = NameResolver::new("event").resolve(&event_names)?;
        let events = abi
            .events
            .iter()
            .zip(event_ids)
            .map(|(event, resolved_identifier)| {
                let inputs = event
                    .inputs
                    .iter()
                    .map(|p| {
                        Ok(EventArgument {
                            name: p.name.clone(),
                            ty: parameter_type(p)?,
                            indexed: p.indexed,
                        })
                    })
                    .collect::<Result<Vec<_>>>()
                    .and_then(|inputs| {
                        validate_struct_components(inputs.iter().map(|a| &a.ty))?;
                        Ok(inputs)
                    })
                    .map_err(|e| e.within(&event.name))?;
                Ok(EventDescription {
                    name: event.name.clone(),
                    inputs,
                    anonymous: event.anonymous,
                    resolved_identifier,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let error_names: Vec<&str> = abi.errors.iter().map(|e| e.name.as_str()).collect();
        let error_ids = NameResolver::new("error").resolve(&error_names)?;
        let errors = abi
            .errors
            .iter()
            .zip(error_ids)
            .map(|(error, resolved_identifier)| {
                Ok(ErrorDescription {
                    name: error.name.clone(),
                    inputs: named_types(&error.inputs).map_err(|e| e.within(&error.name))?,
                    resolved_identifier,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut contract = Self {
            name: name.to_string(),
            constructor,
            functions,
            events,
            errors,
            structs: Vec::new(),
            has_fallback: abi.has_fallback,
            has_receive: abi.has_receive,
        };

        let mut deduplicator = StructDeduplicator::new();
        deduplicator.add_contract(&contract)?;
        contract.structs = deduplicator.into_structs();

        Ok(contract)
    }

    /// Every parameter list of the contract in declaration order
    pub fn signature_types(&self) -> Vec<&EvmType> {
        let mut types = Vec::new();
        if let Some(constructor) = &self.constructor {
            types.extend(constructor.inputs.iter().map(|p| &p.ty));
        }
        for function in &self.functions {
            types.extend(function.inputs.iter().map(|p| &p.ty));
            types.extend(function.outputs.iter().map(|p| &p.ty));
        }
        for event in &self.events {
            types.extend(event.inputs.iter().map(|p| &p.ty));
        }
        for error in &self.errors {
            types.extend(error.inputs.iter().map(|p| &p.ty));
        }
        types
    }
}

impl FunctionDescription {
    /// Canonical signature, e.g. `transfer(address,uint256)`
    pub fn signature(&self) -> String {
        canonical_signature(&self.name, self.inputs.iter().map(|p| &p.ty))
    }

    /// 4-byte selector as a 0x-prefixed hex string
    pub fn selector(&self) -> String {
        selector(&self.signature(), 4)
    }

    /// Whether calling the function does not modify state
    pub fn is_constant(&self) -> bool {
        self.state_mutability == "view" || self.state_mutability == "pure"
    }
}

impl EventDescription {
    pub fn signature(&self) -> String {
        canonical_signature(&self.name, self.inputs.iter().map(|p| &p.ty))
    }

    /// 32-byte topic hash
    pub fn topic(&self) -> String {
        selector(&self.signature(), 32)
    }
}

impl ErrorDescription {
    pub fn signature(&self) -> String {
        canonical_signature(&self.name, self.inputs.iter().map(|p| &p.ty))
    }

    pub fn selector(&self) -> String {
        selector(&self.signature(), 4)
    }
}

fn canonical_signature<'a>(name: &str, types: impl Iterator<Item = &'a EvmType>) -> String {
    let types: Vec<String> = types.map(EvmType::canonical).collect();
    format!("{}({})", name, types.join(","))
}

fn selector(signature: &str, len: usize) -> String {
    let mut hasher = Keccak256::new();
    hasher.update(signature.as_bytes());
    let hash = hasher.finalize();
    format!("0x{}", hex::encode(&hash[..len]))
}

fn parameter_type(param: &AbiParameter) -> Result<EvmType> {
    parse_evm_type(
        &param.param_type,
        param.components.as_deref(),
        param.internal_type.as_deref(),
    )
    .map_err(|e| {
        if param.name.is_empty() {
            e
        } else {
            e.within(&param.name)
        }
    })
}

fn named_types(params: &[AbiParameter]) -> Result<Vec<NamedEvmType>> {
    let named = params
        .iter()
        .map(|p| {
            Ok(NamedEvmType {
                name: p.name.clone(),
                ty: parameter_type(p)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    validate_struct_components(named.iter().map(|p| &p.ty))?;
    Ok(named)
}
