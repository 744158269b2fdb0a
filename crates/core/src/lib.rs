//! ABI type model and the target-independent generation stages

pub mod abi;
pub mod barrel;
pub mod config;
pub mod contract;
pub mod grouping;
pub mod names;
pub mod structs;
pub mod target;
pub mod types;

pub use abi::{AbiDefinition, AbiParser};
pub use barrel::{create_barrel_files, BarrelOptions};
pub use config::{TypeNames, TypegenConfig};
pub use contract::ContractInfo;
pub use target::Target;
pub use types::{EvmType, EvmTypeKind, NamedEvmType, StructName, StructType};

/// Re-export common types from typegen-common
pub use typegen_common::{Error, FileDescription, Result};
