//! Parameter schemas of the modules this crate knows how to drive.
//!
//! The toolkit itself is the authority on which modules exist; the catalogue
//! only supplies the typed schema used to validate bindings.

use crate::module::ModuleId;
use crate::params::{ParamDef, ParamKind, ParameterSet};

/// Terrain morphometry library of the toolkit.
pub const MORPHOMETRY_LIBRARY: &str = "ta_morphometry";

/// Slope, aspect and curvatures from a DEM.
pub const SLOPE_ASPECT_CURVATURE: ModuleId = ModuleId::new(MORPHOMETRY_LIBRARY, 0);

/// Curvature classification of a DEM.
pub const CURVATURE_CLASSIFICATION: ModuleId = ModuleId::new(MORPHOMETRY_LIBRARY, 4);

/// Methods offered by the slope/aspect/curvature module, in toolkit order.
pub const CURVATURE_METHODS: &[&str] = &[
    "maximum slope (Travis et al. 1975)",
    "maximum triangle slope (Tarboton 1997)",
    "least squares fitted plane (Horn 1981, Costa-Cabral & Burgess 1996)",
    "6 parameter 2nd order polynom (Evans 1979)",
    "6 parameter 2nd order polynom (Heerdegen & Beran 1982)",
    "6 parameter 2nd order polynom (Bauer, Rohdenburg, Bork 1985)",
    "9 parameter 2nd order polynom (Zevenbergen & Thorne 1987)",
    "10 parameter 3rd order polynom (Haralick 1983)",
    "10 parameter 3rd order polynom (Florinsky 2009)",
];

pub const SLOPE_UNITS: &[&str] = &["radians", "degree", "percent"];

pub const ASPECT_UNITS: &[&str] = &["radians", "degree"];

/// A catalogue entry.
#[derive(Debug, Clone)]
pub struct ModuleEntry {
    pub id: ModuleId,
    pub name: &'static str,
    pub params: Vec<ParamDef>,
}

impl ModuleEntry {
    /// A fresh parameter set validated against this entry's schema.
    pub fn parameter_set(&self) -> ParameterSet {
        ParameterSet::new(self.name, self.params.clone())
    }
}

fn grid_in(id: &'static str, label: &'static str) -> ParamDef {
    ParamDef {
        id,
        label,
        kind: ParamKind::GridInput { optional: false },
    }
}

fn grid_out(id: &'static str, label: &'static str, optional: bool) -> ParamDef {
    ParamDef {
        id,
        label,
        kind: ParamKind::GridOutput { optional },
    }
}

fn choice(id: &'static str, label: &'static str, options: &'static [&'static str], default: usize) -> ParamDef {
    ParamDef {
        id,
        label,
        kind: ParamKind::Choice { options, default },
    }
}

/// Look up the schema of a module.
pub fn lookup(id: &ModuleId) -> Option<ModuleEntry> {
    match (id.library, id.index) {
        (MORPHOMETRY_LIBRARY, 0) => Some(ModuleEntry {
            id: *id,
            name: "Slope, Aspect, Curvature",
            params: vec![
                grid_in("ELEVATION", "Elevation"),
                grid_out("SLOPE", "Slope", false),
                grid_out("ASPECT", "Aspect", false),
                grid_out("C_GENE", "General Curvature", true),
                grid_out("C_PROF", "Profile Curvature", true),
                grid_out("C_PLAN", "Plan Curvature", true),
                grid_out("C_TANG", "Tangential Curvature", true),
                grid_out("C_LONG", "Longitudinal Curvature", true),
                grid_out("C_CROS", "Cross-Sectional Curvature", true),
                grid_out("C_MINI", "Minimal Curvature", true),
                grid_out("C_MAXI", "Maximal Curvature", true),
                grid_out("C_TOTA", "Total Curvature", true),
                grid_out("C_ROTO", "Flow Line Curvature", true),
                choice("METHOD", "Method", CURVATURE_METHODS, 6),
                choice("UNIT_SLOPE", "Slope Units", SLOPE_UNITS, 0),
                choice("UNIT_ASPECT", "Aspect Units", ASPECT_UNITS, 0),
            ],
        }),
        (MORPHOMETRY_LIBRARY, 4) => Some(ModuleEntry {
            id: *id,
            name: "Curvature Classification",
            params: vec![
                grid_in("DEM", "Elevation"),
                grid_out("CLASS", "Curvature Classification", false),
                ParamDef {
                    id: "THRESHOLD",
                    label: "Threshold for plane",
                    kind: ParamKind::Float {
                        default: 0.001,
                        min: 0.0,
                        max: f64::MAX,
                    },
                },
            ],
        }),
        _ => None,
    }
}

/// Parameter set for a module: typed when catalogued, open otherwise.
pub fn parameter_set(id: &ModuleId, name: &str) -> ParameterSet {
    match lookup(id) {
        Some(entry) => entry.parameter_set(),
        None => ParameterSet::open(name),
    }
}
