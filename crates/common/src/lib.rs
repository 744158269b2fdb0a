//! Common types and utilities for the ABI type generator

use serde::{Deserialize, Serialize};

/// A generated file, relative to the output directory
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileDescription {
    /// Posix-style relative path
    pub path: String,

    /// Full file contents
    pub contents: String,
}

impl FileDescription {
    /// Create a new file description
    pub fn new<P: Into<String>, C: Into<String>>(path: P, contents: C) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// Error type for type generation
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// ABI entry or type string that does not follow the ABI grammar
    #[error("Malformed ABI{}: {message}", display_scope(.scope))]
    MalformedAbi { scope: String, message: String },

    /// Identifier clash inside one contract
    #[error("Name collision{}: {message}", display_scope(.scope))]
    NameCollision { scope: String, message: String },

    /// Two different contents for the same output path
    #[error("Path collision: {0}")]
    PathCollision(String),

    /// Missing or invalid target configuration
    #[error("Configuration error{}: {message}", display_scope(.scope))]
    Configuration { scope: String, message: String },

    /// Generated path that cannot be placed in the module tree
    #[error("Malformed path: {0}")]
    MalformedPath(String),

    /// Template registration or rendering failure
    #[error("Template error: {0}")]
    Template(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

fn display_scope(scope: &str) -> String {
    if scope.is_empty() {
        String::new()
    } else {
        format!(" in {}", scope)
    }
}

impl Error {
    /// Create a new malformed ABI error
    pub fn malformed_abi<S: Into<String>>(msg: S) -> Self {
        Error::MalformedAbi {
            scope: String::new(),
            message: msg.into(),
        }
    }

    /// Create a new name collision error
    pub fn name_collision<S: Into<String>>(msg: S) -> Self {
        Error::NameCollision {
            scope: String::new(),
            message: msg.into(),
        }
    }

    /// Create a new path collision error
    pub fn path_collision<S: Into<String>>(path: S) -> Self {
        Error::PathCollision(path.into())
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Error::Configuration {
            scope: String::new(),
            message: msg.into(),
        }
    }

    /// Create a new malformed path error
    pub fn malformed_path<S: Into<String>>(path: S) -> Self {
        Error::MalformedPath(path.into())
    }

    /// Create a new template error
    pub fn template<S: Into<String>>(msg: S) -> Self {
        Error::Template(msg.into())
    }

    /// Prefix the diagnostic scope with an outer segment.
    ///
    /// Called innermost first, so `err.within("transfer").within("ERC20")`
    /// reads `ERC20 > transfer`. Kinds without a scope are returned unchanged.
    pub fn within<S: AsRef<str>>(self, segment: S) -> Self {
        let segment = segment.as_ref();
        let prefix = |scope: String| {
            if scope.is_empty() {
                segment.to_string()
            } else {
                format!("{} > {}", segment, scope)
            }
        };

        match self {
            Error::MalformedAbi { scope, message } => Error::MalformedAbi {
                scope: prefix(scope),
                message,
            },
            Error::NameCollision { scope, message } => Error::NameCollision {
                scope: prefix(scope),
                message,
            },
            Error::Configuration { scope, message } => Error::Configuration {
                scope: prefix(scope),
                message,
            },
            other => other,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(format!("JSON serialization error: {}", err))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(format!("TOML parsing error: {}", err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
