//! Session bootstrap: module search path registration with muted toolkit output

use std::ffi::OsString;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::toolkit::{MessageLock, ModuleManager};

/// Base directory of the 32-bit Windows distribution.
pub const SAGA_32: &str = "SAGA_32";

/// Module library directory on other platforms.
pub const SAGA_MLB: &str = "SAGA_MLB";

/// Source of environment variables.
pub trait EnvLookup {
    fn var(&self, key: &str) -> Option<String>;
}

/// The environment of the running process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }
}

impl<F> EnvLookup for F
where
    F: Fn(&str) -> Option<String>,
{
    fn var(&self, key: &str) -> Option<String> {
        self(key)
    }
}

/// Platform family, deciding how the module directory is located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Unix,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }
}

/// Where the toolkit's modules and shared libraries live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSearchPath {
    pub module_dir: PathBuf,
    /// Directory to append to the dynamic-library search path (Windows only)
    pub dll_dir: Option<PathBuf>,
}

impl ModuleSearchPath {
    pub fn from_env(platform: Platform, env: &impl EnvLookup) -> Result<Self> {
        match platform {
            Platform::Windows => {
                let base = PathBuf::from(env.var(SAGA_32).ok_or(Error::MissingEnv(SAGA_32))?);
                Ok(Self {
                    module_dir: base.join("modules"),
                    dll_dir: Some(base.join("dll")),
                })
            }
            Platform::Unix => {
                let mlb = env.var(SAGA_MLB).ok_or(Error::MissingEnv(SAGA_MLB))?;
                Ok(Self {
                    module_dir: PathBuf::from(mlb),
                    dll_dir: None,
                })
            }
        }
    }

    /// `current` with the dll directory appended, `None` when nothing changes.
    pub fn library_path(&self, current: Option<OsString>) -> Result<Option<OsString>> {
        let Some(dll_dir) = &self.dll_dir else {
            return Ok(None);
        };

        let mut paths: Vec<PathBuf> = current
            .as_deref()
            .map(|c| std::env::split_paths(c).collect())
            .unwrap_or_default();
        paths.push(dll_dir.clone());

        std::env::join_paths(paths)
            .map(Some)
            .map_err(|e| Error::Toolkit(format!("cannot extend PATH: {}", e)))
    }
}

/// Prepare the toolkit: locate its modules and register them while its
/// message output is locked.
///
/// Returns the number of module libraries registered.
pub fn bootstrap<M: ModuleManager + ?Sized>(
    manager: &mut M,
    platform: Platform,
    env: &impl EnvLookup,
) -> Result<usize> {
    let mut toolkit = MessageLock::new(manager);

    let search = ModuleSearchPath::from_env(platform, env)?;
    if let Some(path) = search.library_path(std::env::var_os("PATH"))? {
        debug!("PATH extended with {:?}", search.dll_dir);
        std::env::set_var("PATH", path);
    }

    let count = toolkit.add_directory(&search.module_dir)?;
    info!(
        "Registered {} module libraries from {}",
        count,
        search.module_dir.display()
    );
    Ok(count)
}
