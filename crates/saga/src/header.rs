//! Grid system from native grid headers.
//!
//! A native grid is a text header (`.sgrd`) of `KEY = value` lines next to a
//! binary data file (`.sdat`). Only the header is read here; cell data is
//! left to the toolkit.

use std::fs;
use std::path::Path;

use morphokit_core::GridSystem;

use crate::error::{Result, SagaError};

/// Header fields this crate uses.
#[derive(Debug, Clone, PartialEq)]
pub struct GridHeader {
    pub name: Option<String>,
    pub system: GridSystem,
}

/// Read the header at `path`.
pub fn read_header(path: &Path) -> Result<GridHeader> {
    let text = fs::read_to_string(path)?;
    parse_header(&text).map_err(|reason| SagaError::Header {
        path: path.to_path_buf(),
        reason,
    })
}

/// Parse header text. Keys are matched case-insensitively.
pub fn parse_header(text: &str) -> std::result::Result<GridHeader, String> {
    let mut name = None;
    let mut cell_size = None;
    let mut x_min = None;
    let mut y_min = None;
    let mut cols = None;
    let mut rows = None;

    for line in text.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim();

        match key.trim().to_uppercase().as_str() {
            "NAME" if !value.is_empty() => name = Some(value.to_string()),
            "CELLSIZE" => cell_size = Some(number(key, value)?),
            "POSITION_XMIN" => x_min = Some(number(key, value)?),
            "POSITION_YMIN" => y_min = Some(number(key, value)?),
            "CELLCOUNT_X" => cols = Some(count(key, value)?),
            "CELLCOUNT_Y" => rows = Some(count(key, value)?),
            _ => {}
        }
    }

    let system = GridSystem::new(
        cell_size.ok_or("missing CELLSIZE")?,
        x_min.ok_or("missing POSITION_XMIN")?,
        y_min.ok_or("missing POSITION_YMIN")?,
        cols.ok_or("missing CELLCOUNT_X")?,
        rows.ok_or("missing CELLCOUNT_Y")?,
    )
    .map_err(|e| e.to_string())?;

    Ok(GridHeader { name, system })
}

fn number(key: &str, value: &str) -> std::result::Result<f64, String> {
    value
        .parse()
        .map_err(|_| format!("{} is not a number: {}", key.trim(), value))
}

fn count(key: &str, value: &str) -> std::result::Result<usize, String> {
    value
        .parse()
        .map_err(|_| format!("{} is not a cell count: {}", key.trim(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const HEADER: &str = "NAME\t= dem\n\
        DESCRIPTION\t=\n\
        UNIT\t=\n\
        DATAFILE_OFFSET\t= 0\n\
        DATAFORMAT\t= FLOAT\n\
        BYTEORDER_BIG\t= FALSE\n\
        POSITION_XMIN\t= 1500.0000000000\n\
        POSITION_YMIN\t= 3200.5000000000\n\
        CELLCOUNT_X\t= 120\n\
        CELLCOUNT_Y\t= 80\n\
        CELLSIZE\t= 25.0000000000\n\
        Z_FACTOR\t= 1.000000\n\
        NODATA_VALUE\t= -99999.000000\n\
        TOPTOBOTTOM\t= FALSE\n";

    #[test]
    fn test_parse_header() {
        let header = parse_header(HEADER).unwrap();
        assert_eq!(header.name.as_deref(), Some("dem"));
        assert_eq!(header.system.cols(), 120);
        assert_eq!(header.system.rows(), 80);
        assert_relative_eq!(header.system.cell_size(), 25.0, epsilon = 1e-12);
        assert_relative_eq!(header.system.x_min(), 1500.0, epsilon = 1e-12);
        assert_relative_eq!(header.system.y_min(), 3200.5, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_key() {
        let text = HEADER.replace("CELLSIZE", "CELL_SIZE");
        let err = parse_header(&text).unwrap_err();
        assert!(err.contains("CELLSIZE"));
    }

    #[test]
    fn test_bad_values() {
        let text = HEADER.replace("= 120", "= many");
        assert!(parse_header(&text).unwrap_err().contains("CELLCOUNT_X"));

        let text = HEADER.replace("= 25.0000000000", "= 0");
        assert!(parse_header(&text).is_err());
    }

    #[test]
    fn test_lowercase_keys() {
        let header = parse_header(&HEADER.to_lowercase()).unwrap();
        assert_eq!(header.system.cols(), 120);
    }
}
