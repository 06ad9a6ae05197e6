//! Grid system: the spatial template shared by conformant grids

use std::fmt;

use crate::error::{Error, Result};

/// Relative tolerance used when comparing cell sizes and positions.
const EPSILON: f64 = 1e-8;

/// Spatial template of a grid: cell size, lower-left cell center and
/// dimensions.
///
/// Positions follow the toolkit convention and refer to cell centers:
/// ```text
/// x(col) = x_min + col * cell_size
/// y(row) = y_min + row * cell_size
/// ```
///
/// Every grid bound to one module invocation must share the same system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSystem {
    cell_size: f64,
    x_min: f64,
    y_min: f64,
    cols: usize,
    rows: usize,
}

impl GridSystem {
    /// Create a grid system, rejecting empty or degenerate templates.
    pub fn new(cell_size: f64, x_min: f64, y_min: f64, cols: usize, rows: usize) -> Result<Self> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(Error::InvalidGridSystem(format!(
                "cell size must be positive, got {}",
                cell_size
            )));
        }
        if !(x_min.is_finite() && y_min.is_finite()) {
            return Err(Error::InvalidGridSystem(
                "lower-left position is not finite".to_string(),
            ));
        }
        if cols == 0 || rows == 0 {
            return Err(Error::InvalidGridSystem(format!(
                "dimensions must be non-zero, got {}x{}",
                cols, rows
            )));
        }

        Ok(Self {
            cell_size,
            x_min,
            y_min,
            cols,
            rows,
        })
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Total number of cells
    pub fn cell_count(&self) -> usize {
        self.cols * self.rows
    }

    /// X coordinate of the lower-left cell center
    pub fn x_min(&self) -> f64 {
        self.x_min
    }

    /// Y coordinate of the lower-left cell center
    pub fn y_min(&self) -> f64 {
        self.y_min
    }

    /// X coordinate of the upper-right cell center
    fn x_max(&self) -> f64 {
        self.x_min + (self.cols - 1) as f64 * self.cell_size
    }

    /// Y coordinate of the upper-right cell center
    fn y_max(&self) -> f64 {
        self.y_min + (self.rows - 1) as f64 * self.cell_size
    }

    /// Outer extent covered by the cells as (min_x, min_y, max_x, max_y).
    pub fn extent(&self) -> (f64, f64, f64, f64) {
        let half = 0.5 * self.cell_size;
        (
            self.x_min - half,
            self.y_min - half,
            self.x_max() + half,
            self.y_max() + half,
        )
    }

    /// Whether two systems describe the same cells, within floating point noise.
    pub fn is_equal(&self, other: &GridSystem) -> bool {
        let tol = EPSILON * self.cell_size.max(other.cell_size);

        self.cols == other.cols
            && self.rows == other.rows
            && (self.cell_size - other.cell_size).abs() <= tol
            && (self.x_min - other.x_min).abs() <= tol
            && (self.y_min - other.y_min).abs() <= tol
    }
}

impl fmt::Display for GridSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}; {}x{}; {}, {}",
            self.cell_size, self.cols, self.rows, self.x_min, self.y_min
        )
    }
}
