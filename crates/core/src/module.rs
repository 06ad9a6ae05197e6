//! Module identities and resolved module instances

use std::fmt;

use crate::params::ParameterSet;

/// Identity of a module: library name plus index within the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId {
    pub library: &'static str,
    pub index: usize,
}

impl ModuleId {
    pub const fn new(library: &'static str, index: usize) -> Self {
        Self { library, index }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.library, self.index)
    }
}

/// A module resolved from a [`ModuleManager`](crate::ModuleManager), with a
/// fresh parameter set.
#[derive(Debug, Clone)]
pub struct Module {
    id: ModuleId,
    name: String,
    parameters: ParameterSet,
}

impl Module {
    pub fn new(id: ModuleId, name: impl Into<String>, parameters: ParameterSet) -> Self {
        Self {
            id,
            name: name.into(),
            parameters,
        }
    }

    pub fn id(&self) -> ModuleId {
        self.id
    }

    /// Display name, as reported by the toolkit
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut ParameterSet {
        &mut self.parameters
    }
}
