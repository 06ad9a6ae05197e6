//! File-backed data manager for `saga_cmd` runs.
//!
//! Loaded grids stay where they are. Created grids get a backing header in a
//! scratch directory that `saga_cmd` writes to; saving copies the files the
//! toolkit produced next to that header.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use morphokit_core::{DataManager, Error, Grid, GridId, GridSystem};
use tempfile::TempDir;
use tracing::debug;

use crate::error::SagaError;
use crate::header::read_header;

/// Extension of the native grid header.
pub const HEADER_EXTENSION: &str = "sgrd";

/// Extensions that make up one native grid on disk, header first.
pub const GRID_EXTENSIONS: &[&str] = &["sgrd", "sdat", "mgrd", "prj", "sdat.aux.xml"];

/// Data manager whose grids are native grid files.
#[derive(Debug)]
pub struct SagaData {
    scratch: TempDir,
    next_id: u64,
}

impl SagaData {
    /// Create a data manager with a fresh scratch directory.
    pub fn new() -> Result<Self, SagaError> {
        let scratch = tempfile::Builder::new().prefix("morphokit-").tempdir()?;
        debug!("Scratch directory {}", scratch.path().display());
        Ok(Self { scratch, next_id: 1 })
    }

    fn next_id(&mut self) -> GridId {
        let id = GridId(self.next_id);
        self.next_id += 1;
        id
    }

    fn load(&mut self, path: &Path) -> Result<Grid, SagaError> {
        let is_native = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(HEADER_EXTENSION));
        if !is_native {
            return Err(SagaError::UnsupportedFormat(path.to_path_buf()));
        }

        let header = read_header(path)?;
        let data_file = data_file_of(path);
        if !data_file.is_file() {
            return Err(SagaError::MissingData(data_file));
        }

        let name = header.name.unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
        Ok(Grid::new(self.next_id(), name, header.system, path.to_path_buf()))
    }
}

impl DataManager for SagaData {
    fn load_grid(&mut self, path: &Path) -> morphokit_core::Result<Grid> {
        self.load(path).map_err(|e| {
            debug!("{}", e);
            Error::LoadGrid {
                path: path.to_path_buf(),
            }
        })
    }

    fn create_grid(&mut self, system: &GridSystem, name: &str) -> morphokit_core::Result<Grid> {
        let id = self.next_id();
        let location = with_suffix(
            &self.scratch.path().join(format!("{}_{}", name, id.0)),
            HEADER_EXTENSION,
        );
        Ok(Grid::new(id, name, *system, location))
    }

    fn save_grid(&mut self, grid: &Grid, stem: &Path) -> morphokit_core::Result<PathBuf> {
        let source = grid.location();
        let target = with_suffix(stem, HEADER_EXTENSION);
        if !source.is_file() {
            return Err(Error::SaveGrid {
                path: target,
                reason: format!("{} was never written", grid.name()),
            });
        }

        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        for ext in GRID_EXTENSIONS {
            let from = source.with_extension(ext);
            let to = with_suffix(stem, ext);
            if !from.is_file() || from == to {
                continue;
            }
            fs::copy(&from, &to).map_err(|e| Error::SaveGrid {
                path: to.clone(),
                reason: e.to_string(),
            })?;
            debug!("Copied {} -> {}", from.display(), to.display());
        }

        Ok(target)
    }
}

/// Data file next to a header, `.SDAT` for an upper-case `.SGRD`.
fn data_file_of(header: &Path) -> PathBuf {
    let upper = header
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.bytes().all(|b| b.is_ascii_uppercase()));
    header.with_extension(if upper { "SDAT" } else { "sdat" })
}

/// `stem` + `.` + `ext`, leaving any dots already in `stem` alone.
fn with_suffix(stem: &Path, ext: &str) -> PathBuf {
    let mut s: OsString = stem.as_os_str().to_owned();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}
