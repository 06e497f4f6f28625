//! Spreadsheet decoding into a [`RawGrid`].
//!
//! Workbooks (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`) are read with
//! `calamine` and a single sheet is selected by name; `.csv` exports are read
//! with the `csv` crate. No header row is assumed; schema recovery happens in
//! the normalizer.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use meter_core::models::{CellValue, RawGrid};
use meter_core::{DashboardError, Result};
use tracing::{debug, info};

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

// ── Public API ────────────────────────────────────────────────────────────────

/// Decode `path` into a raw grid. `sheet` selects the worksheet for workbook
/// formats and is ignored for CSV.
pub fn load_grid(path: &Path, sheet: &str) -> Result<RawGrid> {
    std::fs::metadata(path).map_err(|source| DashboardError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let grid = if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
        read_workbook_sheet(path, sheet)?
    } else if extension == "csv" {
        read_csv(path)?
    } else {
        return Err(DashboardError::UnsupportedFormat(path.to_path_buf()));
    };

    info!(
        "Loaded {} rows x {} columns from {}",
        grid.row_count(),
        grid.column_count(),
        path.display()
    );
    Ok(grid)
}

/// Read one named sheet of a workbook.
pub fn read_workbook_sheet(path: &Path, sheet: &str) -> Result<RawGrid> {
    let mut workbook = open_workbook_auto(path).map_err(|e| DashboardError::Workbook {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let names = workbook.sheet_names();
    if !names.iter().any(|n| n == sheet) {
        debug!("Available sheets in {}: {:?}", path.display(), names);
        return Err(DashboardError::SheetNotFound {
            sheet: sheet.to_string(),
            path: path.to_path_buf(),
        });
    }

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| DashboardError::Workbook {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    Ok(grid_from_range(&range))
}

/// Read a CSV file with no header row; every non-empty field becomes text.
pub fn read_csv(path: &Path) -> Result<RawGrid> {
    let file = std::fs::File::open(path).map_err(|source| DashboardError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| DashboardError::Csv {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        rows.push(record.iter().map(CellValue::from_text).collect());
    }

    Ok(RawGrid::new(rows))
}

/// Convert a calamine range into a grid anchored at cell A1.
///
/// calamine trims leading empty rows and columns; they are restored here so
/// that row 1 of the grid is always the second row of the sheet.
pub fn grid_from_range(range: &Range<Data>) -> RawGrid {
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells = vec![CellValue::Missing; col_offset];
        cells.extend(row.iter().map(cell_from_data));
        rows.push(cells);
    }

    RawGrid::new(rows)
}

/// Map a calamine cell onto the boundary cell type.
///
/// Integers, floats and booleans become numbers; date-time cells become
/// dates (durations keep their numeric day count); strings, including ISO
/// date strings, stay text for the normalizer to parse. Error and empty
/// cells are missing.
pub fn cell_from_data(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Number(if *b { 1.0 } else { 0.0 }),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::from_text(s),
        Data::DateTime(dt) => {
            if dt.is_duration() {
                CellValue::Number(dt.as_f64())
            } else {
                dt.as_datetime()
                    .map(CellValue::Date)
                    .unwrap_or(CellValue::Missing)
            }
        }
        Data::Error(_) | Data::Empty => CellValue::Missing,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
