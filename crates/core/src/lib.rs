//! # Morphokit Core
//!
//! Toolkit-neutral model and orchestration for terrain morphometry runs.
//!
//! This crate provides:
//! - `GridSystem` and `Grid`: the spatial template and handles to toolkit-owned grids
//! - `ParameterSet`: typed module parameters validated when bound
//! - `DataManager` / `ModuleManager`: the capabilities a toolkit binding supplies
//! - Session bootstrap and command-line input resolution
//! - `Morphometry`: the slope/aspect/curvature pipeline

pub mod catalog;
pub mod error;
pub mod grid;
pub mod input;
pub mod module;
pub mod morphometry;
pub mod params;
pub mod session;
pub mod toolkit;

pub use error::{Error, Result};
pub use grid::{Grid, GridId, GridSystem};
pub use module::{Module, ModuleId};
pub use morphometry::{Morphometry, MorphometryOptions, MorphometryOutputs, RunObserver, RunState, Stage};
pub use params::{ParamDef, ParamKind, ParamValue, ParameterSet};
pub use toolkit::{DataManager, MessageLock, ModuleManager};
