//! # Morphokit Saga
//!
//! Toolkit binding that drives the `saga_cmd` command-line front end.
//!
//! - [`SagaModules`]: module library manager; lists libraries with
//!   `saga_cmd <library>` and runs modules as child processes
//! - [`SagaData`]: data manager over native grid files (`.sgrd` + `.sdat`)
//!
//! No terrain computation happens in this crate and cell values are never
//! decoded; only grid headers are read.

pub mod command;
pub mod data;
pub mod error;
pub mod header;
pub mod modules;

pub use command::{SagaCmd, DEFAULT_PROGRAM};
pub use data::SagaData;
pub use error::{Result, SagaError};
pub use modules::SagaModules;

/// Data and module managers for one run, using `program` as `saga_cmd`.
pub fn toolkit(program: impl Into<std::path::PathBuf>) -> Result<(SagaData, SagaModules)> {
    Ok((SagaData::new()?, SagaModules::new(SagaCmd::new(program))))
}
