//! Generation run for the ABI type generator

pub mod runner;
pub mod writer;

pub use runner::{clean, ArtifactFailure, GenerationOutcome, GenerationRequest, TypegenRunner};
pub use writer::{write_all, FileWriter, FsWriter};
