//! Error types for the saga_cmd binding

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while driving `saga_cmd`.
#[derive(Error, Debug)]
pub enum SagaError {
    #[error("cannot run {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        source: std::io::Error,
    },

    #[error("module directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("invalid grid header {}: {reason}", path.display())]
    Header { path: PathBuf, reason: String },

    #[error("unsupported grid format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("grid data file missing: {}", .0.display())]
    MissingData(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("core error: {0}")]
    Core(#[from] morphokit_core::Error),
}

impl From<SagaError> for morphokit_core::Error {
    fn from(e: SagaError) -> Self {
        match e {
            SagaError::Core(inner) => inner,
            SagaError::Io(inner) => morphokit_core::Error::Io(inner),
            other => morphokit_core::Error::Toolkit(other.to_string()),
        }
    }
}

/// Result alias for saga_cmd operations.
pub type Result<T> = std::result::Result<T, SagaError>;
