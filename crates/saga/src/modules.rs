//! Module library manager backed by `saga_cmd`

use std::collections::{BTreeSet, HashMap};
use std::ffi::OsString;
use std::fs;
use std::path::Path;

use morphokit_core::catalog;
use morphokit_core::{Module, ModuleId, ModuleManager, ParamValue};
use tracing::{debug, info, warn};

use crate::command::SagaCmd;
use crate::error::SagaError;

/// One `[index] name` entry of a library listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedModule {
    pub index: usize,
    pub name: String,
}

/// Resolves and runs modules through `saga_cmd`.
#[derive(Debug, Default)]
pub struct SagaModules {
    cmd: SagaCmd,
    libraries: BTreeSet<String>,
    listings: HashMap<String, Vec<ListedModule>>,
}

impl SagaModules {
    pub fn new(cmd: SagaCmd) -> Self {
        Self {
            cmd,
            libraries: BTreeSet::new(),
            listings: HashMap::new(),
        }
    }

    /// Modules of `library`, listed once and cached.
    pub fn listing(&mut self, library: &str) -> morphokit_core::Result<&[ListedModule]> {
        if !self.listings.contains_key(library) {
            let output = self.cmd.run([library])?;
            let listed = parse_listing(output.lines());
            debug!("Library {} lists {} modules", library, listed.len());
            self.listings.insert(library.to_string(), listed);
        }
        Ok(self.listings.get(library).map(Vec::as_slice).unwrap_or(&[]))
    }
}

impl ModuleManager for SagaModules {
    fn add_directory(&mut self, dir: &Path) -> morphokit_core::Result<usize> {
        if !dir.is_dir() {
            return Err(SagaError::MissingDirectory(dir.to_path_buf()).into());
        }

        let mut found = 0;
        for entry in fs::read_dir(dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };
            if let Some(name) = library_name(&entry.file_name().to_string_lossy()) {
                if self.libraries.insert(name.to_string()) {
                    found += 1;
                }
            }
        }

        self.cmd.add_module_dir(dir);
        info!("Found {} module libraries in {}", found, dir.display());
        Ok(found)
    }

    fn get_module(&mut self, id: &ModuleId) -> morphokit_core::Result<Option<Module>> {
        if !self.libraries.contains(id.library) {
            debug!("Library {} is not registered", id.library);
            return Ok(None);
        }

        let name = self
            .listing(id.library)?
            .iter()
            .find(|m| m.index == id.index)
            .map(|m| m.name.clone());

        Ok(name.map(|name| {
            let parameters = catalog::parameter_set(id, &name);
            Module::new(*id, name, parameters)
        }))
    }

    fn execute(&mut self, module: &Module) -> morphokit_core::Result<bool> {
        let id = module.id();
        let mut args: Vec<OsString> = vec![id.library.into(), id.index.to_string().into()];
        for (key, value) in module.parameters().iter() {
            args.push(format!("-{}", key).into());
            args.push(match value {
                ParamValue::Grid(grid) => grid.location().as_os_str().to_owned(),
                ParamValue::Choice(index) => index.to_string().into(),
                ParamValue::Float(v) => v.to_string().into(),
            });
        }

        info!("Executing [{}]", module.name());
        let output = self.cmd.run(args)?;
        if !output.success {
            for line in output.lines().filter(|l| l.to_lowercase().contains("error")) {
                warn!("{}", line.trim());
            }
        }
        Ok(output.success)
    }

    fn lock_messages(&mut self) {
        self.cmd.mute();
    }

    fn unlock_messages(&mut self) {
        self.cmd.unmute();
    }

    fn version(&mut self) -> Option<String> {
        let output = self.cmd.run(["--version"]).ok()?;
        output
            .stdout
            .lines()
            .chain(output.stderr.lines())
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(str::to_string)
    }
}

/// Library name of a module library file, if it is one.
///
/// Accepts `lib<name>.so`, `lib<name>.dylib` and `<name>.dll`.
pub fn library_name(file_name: &str) -> Option<&str> {
    let name = if let Some(stem) = file_name.strip_suffix(".dll") {
        stem
    } else {
        let stem = file_name
            .strip_suffix(".so")
            .or_else(|| file_name.strip_suffix(".dylib"))?;
        stem.strip_prefix("lib").unwrap_or(stem)
    };
    (!name.is_empty()).then_some(name)
}

/// Parse the module listing printed by `saga_cmd <library>`.
///
/// Entries look like ` [0]\tSlope, Aspect, Curvature`, some versions put a
/// `- ` before the name. Everything else is ignored.
pub fn parse_listing<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<ListedModule> {
    let mut modules = Vec::new();
    for line in lines {
        let Some(rest) = line.trim_start().strip_prefix('[') else {
            continue;
        };
        let Some((index, name)) = rest.split_once(']') else {
            continue;
        };
        let Ok(index) = index.trim().parse::<usize>() else {
            continue;
        };
        let name = name.trim().trim_start_matches('-').trim();
        if !name.is_empty() {
            modules.push(ListedModule {
                index,
                name: name.to_string(),
            });
        }
    }
    modules
}
