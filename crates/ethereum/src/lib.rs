//! ethers target backend for the ABI type generator

pub mod codegen;

pub use codegen::{EthersTarget, TargetRegistry};
