//! Command-line input resolution

use std::path::{Path, PathBuf};

/// DEM used when the command line does not name exactly one input.
pub const FALLBACK_DEM: &str = "./test.sgrd";

pub const USAGE: &str = "Usage: morphometry.py <in: elevation>";

pub const FALLBACK_NOTICE: &str = "... trying to run with test_data";

/// Where to read the DEM from and where to write results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInput {
    pub dem: PathBuf,
    pub output_dir: PathBuf,
    /// Whether the fallback DEM replaced a missing or ambiguous argument
    pub fallback: bool,
}

/// Resolve the DEM path from the user-supplied arguments.
///
/// Exactly one argument is accepted as the DEM. Any other count, zero or
/// several, falls back to [`FALLBACK_DEM`]. A bare file name is anchored to
/// the current directory so the output directory is never empty.
pub fn resolve_input(args: &[PathBuf]) -> ResolvedInput {
    let (dem, fallback) = match args {
        [single] => (anchor(single), false),
        _ => (PathBuf::from(FALLBACK_DEM), true),
    };
    let output_dir = output_dir_of(&dem);

    ResolvedInput {
        dem,
        output_dir,
        fallback,
    }
}

fn anchor(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => path.to_path_buf(),
        _ => Path::new(".").join(path),
    }
}

/// Directory part of `dem`, `./` when there is none.
pub fn output_dir_of(dem: &Path) -> PathBuf {
    match dem.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && parent != Path::new(".") => {
            parent.to_path_buf()
        }
        _ => PathBuf::from("./"),
    }
}
