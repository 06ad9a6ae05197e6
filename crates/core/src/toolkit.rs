//! Capabilities the pipeline needs from the external toolkit.
//!
//! The toolkit owns grids and modules; the pipeline only holds handles. Both
//! capabilities are passed in explicitly so the orchestration can run against
//! any implementation, including in-memory fakes.

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::grid::{Grid, GridSystem};
use crate::module::{Module, ModuleId};

/// Loads, creates and persists grids.
pub trait DataManager {
    /// Load a grid from disk. Fails with [`Error::LoadGrid`](crate::Error::LoadGrid)
    /// when the file is missing or not a valid grid.
    fn load_grid(&mut self, path: &Path) -> Result<Grid>;

    /// Create an empty grid bound to `system`.
    fn create_grid(&mut self, system: &GridSystem, name: &str) -> Result<Grid>;

    /// Persist `grid` under `stem`; the toolkit picks the extension.
    ///
    /// Returns the path of the primary file written.
    fn save_grid(&mut self, grid: &Grid, stem: &Path) -> Result<PathBuf>;
}

/// Resolves and executes modules.
pub trait ModuleManager {
    /// Register a directory of module libraries, returning how many were found.
    fn add_directory(&mut self, dir: &Path) -> Result<usize>;

    /// Resolve a module with a fresh parameter set, `None` when the library or
    /// index does not exist.
    fn get_module(&mut self, id: &ModuleId) -> Result<Option<Module>>;

    /// Run a module with its bound parameters. `Ok(false)` means the toolkit
    /// reported failure.
    fn execute(&mut self, module: &Module) -> Result<bool>;

    /// Suppress toolkit message output until the matching unlock.
    fn lock_messages(&mut self);

    fn unlock_messages(&mut self);

    /// Toolkit version banner, if it can tell.
    fn version(&mut self) -> Option<String> {
        None
    }
}

/// Holds the toolkit message lock for its lifetime.
///
/// The lock is released on drop, so early returns and `?` never leave the
/// toolkit muted.
pub struct MessageLock<'a, M: ModuleManager + ?Sized> {
    manager: &'a mut M,
}

impl<'a, M: ModuleManager + ?Sized> MessageLock<'a, M> {
    pub fn new(manager: &'a mut M) -> Self {
        manager.lock_messages();
        Self { manager }
    }
}

impl<M: ModuleManager + ?Sized> Deref for MessageLock<'_, M> {
    type Target = M;

    fn deref(&self) -> &M {
        self.manager
    }
}

impl<M: ModuleManager + ?Sized> DerefMut for MessageLock<'_, M> {
    fn deref_mut(&mut self) -> &mut M {
        self.manager
    }
}

impl<M: ModuleManager + ?Sized> Drop for MessageLock<'_, M> {
    fn drop(&mut self) {
        self.manager.unlock_messages();
    }
}
