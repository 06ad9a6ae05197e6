//! Child-process front end of the toolkit

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tracing::debug;

use crate::error::{Result, SagaError};

/// Environment variable `saga_cmd` reads its module directories from.
const MODULE_PATH_VAR: &str = "SAGA_MLB";

/// Default executable name, looked up on `PATH`.
pub const DEFAULT_PROGRAM: &str = "saga_cmd";

/// Finished invocation of `saga_cmd`.
#[derive(Debug, Clone)]
pub struct CmdOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CmdOutput {
    fn from_output(output: Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    /// Lines of both streams, stdout first.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.stdout.lines().chain(self.stderr.lines())
    }
}

/// Runs `saga_cmd` with the registered module directories.
#[derive(Debug, Clone)]
pub struct SagaCmd {
    program: PathBuf,
    module_dirs: Vec<PathBuf>,
    /// Message lock depth; captured output is only logged at zero
    muted: u32,
}

impl Default for SagaCmd {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl SagaCmd {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            module_dirs: Vec::new(),
            muted: 0,
        }
    }

    pub fn add_module_dir(&mut self, dir: &Path) {
        if !self.module_dirs.iter().any(|d| d == dir) {
            self.module_dirs.push(dir.to_path_buf());
        }
    }

    pub fn mute(&mut self) {
        self.muted += 1;
    }

    pub fn unmute(&mut self) {
        self.muted = self.muted.saturating_sub(1);
    }

    pub fn is_muted(&self) -> bool {
        self.muted > 0
    }

    /// Run `saga_cmd` with `args` and wait for it to finish.
    pub fn run<I, S>(&self, args: I) -> Result<CmdOutput>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let mut command = Command::new(&self.program);
        command.args(&args);

        if !self.module_dirs.is_empty() {
            let joined = std::env::join_paths(&self.module_dirs).map_err(|e| SagaError::Spawn {
                program: self.program.clone(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
            })?;
            command.env(MODULE_PATH_VAR, joined);
        }

        debug!("{} {:?}", self.program.display(), args);
        let output = command.output().map_err(|source| SagaError::Spawn {
            program: self.program.clone(),
            source,
        })?;
        let output = CmdOutput::from_output(output);

        if !self.is_muted() {
            for line in output.lines().filter(|l| !l.trim().is_empty()) {
                debug!("saga_cmd: {}", line);
            }
        }

        Ok(output)
    }
}
