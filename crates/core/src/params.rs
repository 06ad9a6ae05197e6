//! Typed parameter sets with bind-time validation.
//!
//! Each module describes its parameters with [`ParamDef`]s. A [`ParameterSet`]
//! holds the values bound for one invocation and rejects unknown names,
//! mismatched kinds, out-of-range values and grids that do not conform to the
//! assigned grid system at the moment they are bound.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::grid::{Grid, GridSystem};

/// Definition of a single module parameter.
#[derive(Debug, Clone)]
pub struct ParamDef {
    /// Identifier the toolkit knows the parameter by, e.g. `ELEVATION`
    pub id: &'static str,
    pub label: &'static str,
    pub kind: ParamKind,
}

/// The kind of a parameter, determining which values it accepts.
#[derive(Debug, Clone)]
pub enum ParamKind {
    /// Grid read by the module.
    GridInput { optional: bool },
    /// Grid written by the module.
    GridOutput { optional: bool },
    /// Selection from a list of options, bound by index.
    Choice {
        options: &'static [&'static str],
        default: usize,
    },
    /// Floating point value with inclusive range and default.
    Float { default: f64, min: f64, max: f64 },
}

impl ParamKind {
    fn expects(&self) -> &'static str {
        match self {
            Self::GridInput { .. } | Self::GridOutput { .. } => "grid",
            Self::Choice { .. } => "choice",
            Self::Float { .. } => "float",
        }
    }
}

/// Runtime parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Grid(Grid),
    Choice(usize),
    Float(f64),
}

impl ParamValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Grid(_) => "grid",
            Self::Choice(_) => "choice",
            Self::Float(_) => "float",
        }
    }

    pub fn as_grid(&self) -> Option<&Grid> {
        match self {
            Self::Grid(g) => Some(g),
            _ => None,
        }
    }

}

impl From<Grid> for ParamValue {
    fn from(grid: Grid) -> Self {
        Self::Grid(grid)
    }
}

impl From<&Grid> for ParamValue {
    fn from(grid: &Grid) -> Self {
        Self::Grid(grid.clone())
    }
}

/// The bound parameters of one module invocation.
#[derive(Debug, Clone)]
pub struct ParameterSet {
    module: String,
    /// `None` for modules without a known schema: every binding is accepted.
    defs: Option<Vec<ParamDef>>,
    grid_system: Option<GridSystem>,
    values: BTreeMap<String, ParamValue>,
}

impl ParameterSet {
    /// A parameter set validated against `defs`.
    pub fn new(module: impl Into<String>, defs: Vec<ParamDef>) -> Self {
        Self {
            module: module.into(),
            defs: Some(defs),
            grid_system: None,
            values: BTreeMap::new(),
        }
    }

    /// A parameter set that accepts any name and value.
    pub fn open(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            defs: None,
            grid_system: None,
            values: BTreeMap::new(),
        }
    }

    /// Parameter definitions, empty for open sets.
    pub fn defs(&self) -> &[ParamDef] {
        self.defs.as_deref().unwrap_or(&[])
    }

    pub fn is_open(&self) -> bool {
        self.defs.is_none()
    }

    pub fn grid_system(&self) -> Option<&GridSystem> {
        self.grid_system.as_ref()
    }

    /// Assign the grid system all grid parameters must conform to.
    ///
    /// Grids already bound that do not conform to the new system are unbound.
    pub fn assign_grid_system(&mut self, system: &GridSystem) {
        self.values.retain(|_, value| match value {
            ParamValue::Grid(grid) => grid.system().is_equal(system),
            _ => true,
        });
        self.grid_system = Some(*system);
    }

    /// Bind `value` to the parameter `id`.
    pub fn set(&mut self, id: &str, value: impl Into<ParamValue>) -> Result<()> {
        let value = value.into();

        if let Some(def) = self.def(id)? {
            validate(def, &value)?;
        }

        if let ParamValue::Grid(grid) = &value {
            let system = self
                .grid_system
                .as_ref()
                .ok_or_else(|| Error::GridSystemNotAssigned(id.to_string()))?;
            if !grid.system().is_equal(system) {
                return Err(Error::GridSystemMismatch {
                    name: id.to_string(),
                    expected: system.to_string(),
                    actual: grid.system().to_string(),
                });
            }
        }

        self.values.insert(id.to_string(), value);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&ParamValue> {
        self.values.get(id)
    }

    /// Bound values in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Verify every non-optional grid input is bound.
    pub fn check(&self) -> Result<()> {
        for def in self.defs() {
            if let ParamKind::GridInput { optional: false } = def.kind {
                if !self.values.contains_key(def.id) {
                    return Err(Error::MissingParameter {
                        module: self.module.clone(),
                        name: def.id.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn def(&self, id: &str) -> Result<Option<&ParamDef>> {
        match &self.defs {
            None => Ok(None),
            Some(defs) => defs
                .iter()
                .find(|d| d.id == id)
                .map(Some)
                .ok_or_else(|| Error::UnknownParameter {
                    module: self.module.clone(),
                    name: id.to_string(),
                }),
        }
    }
}

fn validate(def: &ParamDef, value: &ParamValue) -> Result<()> {
    match (&def.kind, value) {
        (ParamKind::GridInput { .. } | ParamKind::GridOutput { .. }, ParamValue::Grid(_)) => Ok(()),
        (ParamKind::Choice { options, .. }, ParamValue::Choice(index)) => {
            if *index < options.len() {
                Ok(())
            } else {
                Err(Error::InvalidParameter {
                    name: def.id.to_string(),
                    value: index.to_string(),
                    reason: format!("choice index must be below {}", options.len()),
                })
            }
        }
        (ParamKind::Float { min, max, .. }, ParamValue::Float(v)) => {
            if v.is_finite() && *v >= *min && *v <= *max {
                Ok(())
            } else {
                Err(Error::InvalidParameter {
                    name: def.id.to_string(),
                    value: v.to_string(),
                    reason: format!("must be within [{}, {}]", min, max),
                })
            }
        }
        (kind, value) => Err(Error::ParameterType {
            name: def.id.to_string(),
            expected: kind.expects(),
            actual: value.kind_name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridId;
    use std::path::PathBuf;

    fn defs() -> Vec<ParamDef> {
        vec![
            ParamDef {
                id: "DEM",
                label: "Elevation",
                kind: ParamKind::GridInput { optional: false },
            },
            ParamDef {
                id: "OUT",
                label: "Result",
                kind: ParamKind::GridOutput { optional: true },
            },
            ParamDef {
                id: "UNIT",
                label: "Unit",
                kind: ParamKind::Choice {
                    options: &["radians", "degree"],
                    default: 0,
                },
            },
            ParamDef {
                id: "THRESHOLD",
                label: "Threshold",
                kind: ParamKind::Float {
                    default: 0.001,
                    min: 0.0,
                    max: f64::MAX,
                },
            },
        ]
    }

    fn grid(id: u64, system: GridSystem) -> Grid {
        Grid::new(GridId(id), "g", system, PathBuf::from("g.sgrd"))
    }

    fn system() -> GridSystem {
        GridSystem::new(10.0, 0.0, 0.0, 20, 20).unwrap()
    }

    #[test]
    fn test_binds_valid_values() {
        let mut params = ParameterSet::new("Test", defs());
        params.assign_grid_system(&system());
        params.set("DEM", grid(1, system())).unwrap();
        params.set("UNIT", ParamValue::Choice(1)).unwrap();
        params.set("THRESHOLD", ParamValue::Float(0.5)).unwrap();

        assert_eq!(params.len(), 3);
        assert!(matches!(params.get("UNIT"), Some(ParamValue::Choice(1))));
        assert!(params.check().is_ok());
    }

    #[test]
    fn test_rejects_unknown_name() {
        let mut params = ParameterSet::new("Test", defs());
        let err = params.set("NOPE", ParamValue::Float(1.0)).unwrap_err();
        assert!(matches!(err, Error::UnknownParameter { .. }));
    }

    #[test]
    fn test_rejects_wrong_kind_and_range() {
        let mut params = ParameterSet::new("Test", defs());
        params.assign_grid_system(&system());

        let err = params.set("DEM", ParamValue::Float(1.0)).unwrap_err();
        assert!(matches!(err, Error::ParameterType { expected: "grid", .. }));

        let err = params.set("UNIT", ParamValue::Choice(2)).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));

        let err = params.set("THRESHOLD", ParamValue::Float(-1.0)).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
    }

    #[test]
    fn test_grid_requires_assigned_system() {
        let mut params = ParameterSet::new("Test", defs());
        let err = params.set("DEM", grid(1, system())).unwrap_err();
        assert!(matches!(err, Error::GridSystemNotAssigned(_)));
    }

    #[test]
    fn test_grid_must_conform() {
        let mut params = ParameterSet::new("Test", defs());
        params.assign_grid_system(&system());

        let other = GridSystem::new(5.0, 0.0, 0.0, 40, 40).unwrap();
        let err = params.set("DEM", grid(1, other)).unwrap_err();
        assert!(matches!(err, Error::GridSystemMismatch { .. }));
    }

    #[test]
    fn test_reassigning_system_unbinds_foreign_grids() {
        let mut params = ParameterSet::new("Test", defs());
        params.assign_grid_system(&system());
        params.set("DEM", grid(1, system())).unwrap();
        params.set("UNIT", ParamValue::Choice(1)).unwrap();

        params.assign_grid_system(&GridSystem::new(5.0, 0.0, 0.0, 40, 40).unwrap());

        assert!(params.get("DEM").is_none());
        assert!(params.get("UNIT").is_some());
    }

    #[test]
    fn test_check_reports_missing_input() {
        let params = ParameterSet::new("Test", defs());
        let err = params.check().unwrap_err();
        assert!(matches!(err, Error::MissingParameter { ref name, .. } if name == "DEM"));
    }

    #[test]
    fn test_open_set_accepts_anything() {
        let mut params = ParameterSet::open("Unknown");
        params.set("WHATEVER", ParamValue::Float(-5.0)).unwrap();
        assert!(params.is_open());
        assert!(params.check().is_ok());
    }
}
