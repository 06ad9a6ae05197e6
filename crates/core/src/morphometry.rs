//! Terrain morphometry pipeline.
//!
//! Loads a DEM, allocates five conformant grids and runs two toolkit modules:
//!
//! 1. *Slope, Aspect, Curvature* writes `slope`, `aspect`, `hcurv` (cross-
//!    sectional curvature) and `vcurv` (longitudinal curvature).
//! 2. *Curvature Classification* writes `ccurv`.
//!
//! Each step saves its outputs before the next one starts, and the first
//! failure stops the run.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::catalog::{CURVATURE_CLASSIFICATION, SLOPE_ASPECT_CURVATURE};
use crate::error::{Error, Result};
use crate::grid::{Grid, GridSystem};
use crate::module::ModuleId;
use crate::params::{ParamValue, ParameterSet};
use crate::toolkit::{DataManager, ModuleManager};

/// Base names of the saved grids, in the order they are written.
pub const OUTPUT_NAMES: [&str; 5] = ["slope", "aspect", "hcurv", "vcurv", "ccurv"];

// ─── Typed module invocations ───────────────────────────────────────────

/// A typed binding record for one module invocation.
pub trait ModuleCall {
    /// Module this record binds
    const MODULE: ModuleId;

    /// Grid system every bound grid conforms to
    fn grid_system(&self) -> &GridSystem;

    /// Bind the record's values into the module's parameter set.
    fn bind(&self, params: &mut ParameterSet) -> Result<()>;
}

/// Units of the slope grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlopeUnit {
    #[default]
    Radians,
    Degree,
    Percent,
}

impl SlopeUnit {
    fn index(self) -> usize {
        match self {
            Self::Radians => 0,
            Self::Degree => 1,
            Self::Percent => 2,
        }
    }
}

impl FromStr for SlopeUnit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "radians" | "rad" => Ok(Self::Radians),
            "degree" | "degrees" | "deg" => Ok(Self::Degree),
            "percent" | "pct" | "%" => Ok(Self::Percent),
            _ => Err(format!(
                "Unknown slope unit: {}. Use radians, degree, or percent.",
                s
            )),
        }
    }
}

/// Units of the aspect grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AspectUnit {
    #[default]
    Radians,
    Degree,
}

impl AspectUnit {
    fn index(self) -> usize {
        match self {
            Self::Radians => 0,
            Self::Degree => 1,
        }
    }
}

impl FromStr for AspectUnit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "radians" | "rad" => Ok(Self::Radians),
            "degree" | "degrees" | "deg" => Ok(Self::Degree),
            _ => Err(format!("Unknown aspect unit: {}. Use radians or degree.", s)),
        }
    }
}

/// Optional settings of both steps. `None` leaves the toolkit default.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MorphometryOptions {
    /// Index into [`CURVATURE_METHODS`](crate::catalog::CURVATURE_METHODS)
    pub method: Option<usize>,
    pub slope_unit: Option<SlopeUnit>,
    pub aspect_unit: Option<AspectUnit>,
    /// Flatness threshold of the curvature classification
    pub threshold: Option<f64>,
}

/// Bindings of the *Slope, Aspect, Curvature* module.
#[derive(Debug, Clone)]
pub struct SlopeAspectCurvature<'a> {
    pub elevation: &'a Grid,
    pub slope: &'a Grid,
    pub aspect: &'a Grid,
    pub cross_curv: &'a Grid,
    pub long_curv: &'a Grid,
    pub method: Option<usize>,
    pub slope_unit: Option<SlopeUnit>,
    pub aspect_unit: Option<AspectUnit>,
}

impl ModuleCall for SlopeAspectCurvature<'_> {
    const MODULE: ModuleId = SLOPE_ASPECT_CURVATURE;

    fn grid_system(&self) -> &GridSystem {
        self.elevation.system()
    }

    fn bind(&self, params: &mut ParameterSet) -> Result<()> {
        params.set("ELEVATION", self.elevation)?;
        params.set("SLOPE", self.slope)?;
        params.set("ASPECT", self.aspect)?;
        params.set("C_CROS", self.cross_curv)?;
        params.set("C_LONG", self.long_curv)?;
        if let Some(method) = self.method {
            params.set("METHOD", ParamValue::Choice(method))?;
        }
        if let Some(unit) = self.slope_unit {
            params.set("UNIT_SLOPE", ParamValue::Choice(unit.index()))?;
        }
        if let Some(unit) = self.aspect_unit {
            params.set("UNIT_ASPECT", ParamValue::Choice(unit.index()))?;
        }
        Ok(())
    }
}

/// Bindings of the *Curvature Classification* module.
#[derive(Debug, Clone)]
pub struct CurvatureClassification<'a> {
    pub dem: &'a Grid,
    pub class: &'a Grid,
    pub threshold: Option<f64>,
}

impl ModuleCall for CurvatureClassification<'_> {
    const MODULE: ModuleId = CURVATURE_CLASSIFICATION;

    fn grid_system(&self) -> &GridSystem {
        self.dem.system()
    }

    fn bind(&self, params: &mut ParameterSet) -> Result<()> {
        params.set("DEM", self.dem)?;
        params.set("CLASS", self.class)?;
        if let Some(threshold) = self.threshold {
            params.set("THRESHOLD", ParamValue::Float(threshold))?;
        }
        Ok(())
    }
}

// ─── Progress reporting ─────────────────────────────────────────────────

/// A step of the pipeline, reported to a [`RunObserver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    LoadGrid(PathBuf),
    AllocateGrids,
    Execute(String),
    Save(&'static str),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadGrid(path) => write!(f, "Loading {}", path.display()),
            Self::AllocateGrids => write!(f, "Allocating output grids"),
            Self::Execute(name) => write!(f, "Running {}", name),
            Self::Save(name) => write!(f, "Saving {}", name),
        }
    }
}

/// Receives stage notifications. Both hooks default to doing nothing.
pub trait RunObserver {
    fn stage_started(&mut self, _stage: &Stage) {}

    fn stage_finished(&mut self, _stage: &Stage, _elapsed: Duration) {}
}

impl RunObserver for () {}

/// Progress of one run. Any error moves the run to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    Loaded,
    StepADone,
    StepBDone,
    Success,
    Failed,
}

/// Files written by a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MorphometryOutputs {
    pub slope: PathBuf,
    pub aspect: PathBuf,
    pub hcurv: PathBuf,
    pub vcurv: PathBuf,
    pub ccurv: PathBuf,
}

impl MorphometryOutputs {
    pub fn paths(&self) -> [&Path; 5] {
        [
            &self.slope,
            &self.aspect,
            &self.hcurv,
            &self.vcurv,
            &self.ccurv,
        ]
    }
}

// ─── Pipeline ───────────────────────────────────────────────────────────

/// Runs the morphometry pipeline against injected toolkit capabilities.
pub struct Morphometry<'t, D: DataManager + ?Sized, M: ModuleManager + ?Sized> {
    data: &'t mut D,
    modules: &'t mut M,
    options: MorphometryOptions,
    state: RunState,
}

impl<'t, D: DataManager + ?Sized, M: ModuleManager + ?Sized> Morphometry<'t, D, M> {
    pub fn new(data: &'t mut D, modules: &'t mut M) -> Self {
        Self {
            data,
            modules,
            options: MorphometryOptions::default(),
            state: RunState::Init,
        }
    }

    pub fn with_options(mut self, options: MorphometryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run both steps on `dem`, saving results into `output_dir`.
    pub fn run(
        &mut self,
        dem: &Path,
        output_dir: &Path,
        observer: &mut dyn RunObserver,
    ) -> Result<MorphometryOutputs> {
        let result = self.run_steps(dem, output_dir, observer);
        if let Err(e) = &result {
            debug!("Run failed in state {:?}: {}", self.state, e);
            self.transition(RunState::Failed);
        }
        result
    }

    fn run_steps(
        &mut self,
        dem_path: &Path,
        output_dir: &Path,
        observer: &mut dyn RunObserver,
    ) -> Result<MorphometryOutputs> {
        let stage = Stage::LoadGrid(dem_path.to_path_buf());
        let dem = observe(observer, stage, || {
            self.data.load_grid(dem_path).map_err(|e| {
                debug!("Load of {} failed: {}", dem_path.display(), e);
                Error::LoadGrid {
                    path: dem_path.to_path_buf(),
                }
            })
        })?;
        let (min_x, min_y, max_x, max_y) = dem.system().extent();
        info!(
            "Loaded {} ({}x{}, {} cells, cell size {}, extent [{}, {}, {}, {}])",
            dem_path.display(),
            dem.system().cols(),
            dem.system().rows(),
            dem.system().cell_count(),
            dem.system().cell_size(),
            min_x,
            min_y,
            max_x,
            max_y
        );
        self.transition(RunState::Loaded);

        let system = *dem.system();
        let grids: [Grid; 5] = observe(observer, Stage::AllocateGrids, || {
            let mut grids = Vec::with_capacity(OUTPUT_NAMES.len());
            for name in OUTPUT_NAMES {
                grids.push(self.data.create_grid(&system, name)?);
            }
            grids
                .try_into()
                .map_err(|_| Error::Toolkit("grid allocation count mismatch".to_string()))
        })?;
        let [slope, aspect, hcurv, vcurv, ccurv] = grids;

        let step_a = SlopeAspectCurvature {
            elevation: &dem,
            slope: &slope,
            aspect: &aspect,
            cross_curv: &hcurv,
            long_curv: &vcurv,
            method: self.options.method,
            slope_unit: self.options.slope_unit,
            aspect_unit: self.options.aspect_unit,
        };
        self.invoke(&step_a, observer)?;

        let slope_path = self.save(&slope, output_dir, "slope", observer)?;
        let aspect_path = self.save(&aspect, output_dir, "aspect", observer)?;
        let hcurv_path = self.save(&hcurv, output_dir, "hcurv", observer)?;
        let vcurv_path = self.save(&vcurv, output_dir, "vcurv", observer)?;
        self.transition(RunState::StepADone);

        let step_b = CurvatureClassification {
            dem: &dem,
            class: &ccurv,
            threshold: self.options.threshold,
        };
        self.invoke(&step_b, observer)?;

        let ccurv_path = self.save(&ccurv, output_dir, "ccurv", observer)?;
        self.transition(RunState::StepBDone);

        self.transition(RunState::Success);
        Ok(MorphometryOutputs {
            slope: slope_path,
            aspect: aspect_path,
            hcurv: hcurv_path,
            vcurv: vcurv_path,
            ccurv: ccurv_path,
        })
    }

    /// Resolve, bind and execute one module. Returns its display name.
    fn invoke<C: ModuleCall>(&mut self, call: &C, observer: &mut dyn RunObserver) -> Result<String> {
        let id = C::MODULE;
        let mut module = self
            .modules
            .get_module(&id)?
            .ok_or_else(|| Error::ModuleNotFound {
                library: id.library.to_string(),
                index: id.index,
            })?;

        let params = module.parameters_mut();
        params.assign_grid_system(call.grid_system());
        call.bind(params)?;
        module.parameters().check()?;

        let name = module.name().to_string();
        let modules = &mut *self.modules;
        observe(observer, Stage::Execute(name.clone()), || {
            match modules.execute(&module) {
                Ok(true) => Ok(()),
                Ok(false) => Err(Error::ExecuteModule {
                    module: name.clone(),
                }),
                Err(e) => {
                    warn!("Module [{}] could not be run: {}", name, e);
                    Err(Error::ExecuteModule {
                        module: name.clone(),
                    })
                }
            }
        })?;

        info!("Executed module [{}] ({})", name, id);
        Ok(name)
    }

    fn save(
        &mut self,
        grid: &Grid,
        output_dir: &Path,
        base: &'static str,
        observer: &mut dyn RunObserver,
    ) -> Result<PathBuf> {
        let stem = output_dir.join(base);
        let path = observe(observer, Stage::Save(base), || self.data.save_grid(grid, &stem))?;
        debug!("Saved {} to {}", base, path.display());
        Ok(path)
    }

    fn transition(&mut self, next: RunState) {
        debug!("Run state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// Wrap `f` in start/finish notifications. Finish is reported on success only.
fn observe<T>(
    observer: &mut dyn RunObserver,
    stage: Stage,
    f: impl FnOnce() -> Result<T>,
) -> Result<T> {
    observer.stage_started(&stage);
    let start = Instant::now();
    let value = f()?;
    observer.stage_finished(&stage, start.elapsed());
    Ok(value)
}
