//! Error types for morphokit

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for morphokit operations.
///
/// The first three variants terminate a run and their `Display` text is what
/// the user sees after the `ERROR: ` prefix.
#[derive(Error, Debug)]
pub enum Error {
    #[error("loading grid [{}]", path.display())]
    LoadGrid { path: PathBuf },

    #[error("executing module [{module}]")]
    ExecuteModule { module: String },

    #[error("module not found [{library}:{index}]")]
    ModuleNotFound { library: String, index: usize },

    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("saving grid [{}]: {reason}", path.display())]
    SaveGrid { path: PathBuf, reason: String },

    #[error("unknown parameter {name} for module [{module}]")]
    UnknownParameter { module: String, name: String },

    #[error("parameter {name} expects {expected}, got {actual}")]
    ParameterType {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("grid system must be assigned before binding grid {0}")]
    GridSystemNotAssigned(String),

    #[error("grid {name} does not conform to the module grid system ({expected} vs {actual})")]
    GridSystemMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("required parameter {name} of module [{module}] is not set")]
    MissingParameter { module: String, name: String },

    #[error("invalid grid system: {0}")]
    InvalidGridSystem(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toolkit error: {0}")]
    Toolkit(String),
}

/// Result type alias for morphokit operations
pub type Result<T> = std::result::Result<T, Error>;
