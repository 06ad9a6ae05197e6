//! Handles to grids owned by a data manager

use std::fmt;
use std::path::{Path, PathBuf};

use super::GridSystem;

/// Unique identifier for a grid within one data manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridId(pub u64);

impl fmt::Display for GridId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A reference to a grid held by a [`DataManager`](crate::DataManager).
///
/// The cell values never live in this process: the handle carries the grid
/// system it is bound to and the location the toolkit reads it from or
/// writes it to.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    id: GridId,
    name: String,
    system: GridSystem,
    location: PathBuf,
}

impl Grid {
    pub fn new(id: GridId, name: impl Into<String>, system: GridSystem, location: PathBuf) -> Self {
        Self {
            id,
            name: name.into(),
            system,
            location,
        }
    }

    pub fn id(&self) -> GridId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The grid system this grid is bound to
    pub fn system(&self) -> &GridSystem {
        &self.system
    }

    /// Backing location used by the toolkit
    pub fn location(&self) -> &Path {
        &self.location
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.id)
    }
}
