//! Spreadsheet reader.
//!
//! Workbooks (xlsx, xls, xlsb, ods) go through calamine; `.csv` files go
//! through the csv crate. Either way the result is a header row plus data
//! rows, with rows whose cells are all blank dropped.

use std::path::Path;

use calamine::{open_workbook_auto, Reader};

use crate::cell::CellValue;
use crate::error::IngestError;

/// Which worksheet of a workbook to read. Ignored for CSV input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelector {
    /// This sheet or an error.
    Named(String),
    /// This sheet when present, else the first one.
    PreferNamed(String),
    FirstAvailable,
}

impl Default for SheetSelector {
    fn default() -> Self {
        SheetSelector::PreferNamed("Data".to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    /// 1-based line in the source file.
    pub line: usize,
    pub cells: Vec<CellValue>,
}

impl GridRow {
    #[must_use]
    pub fn cell(&self, column: usize) -> &CellValue {
        self.cells.get(column).unwrap_or(&CellValue::Empty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetGrid {
    pub sheet_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<GridRow>,
}

/// Reads the header row and data rows of an inventory export.
///
/// # Errors
///
/// - [`IngestError::FileNotFound`] when `path` does not exist.
/// - [`IngestError::SheetNotFound`] when a [`SheetSelector::Named`] sheet is absent.
/// - [`IngestError::Parse`] when the file cannot be decoded.
pub fn read_sheet(path: &Path, selector: &SheetSelector) -> Result<SheetGrid, IngestError> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    let grid = if is_csv {
        read_csv(path)?
    } else {
        read_workbook(path, selector)?
    };

    tracing::debug!(
        path = %path.display(),
        sheet = %grid.sheet_name,
        columns = grid.headers.len(),
        rows = grid.rows.len(),
        "read inventory sheet"
    );
    Ok(grid)
}

fn read_workbook(path: &Path, selector: &SheetSelector) -> Result<SheetGrid, IngestError> {
    let parse_err = |reason: String| IngestError::Parse {
        path: path.to_path_buf(),
        reason,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| parse_err(e.to_string()))?;
    let sheet_names = workbook.sheet_names().to_vec();
    let sheet_name = choose_sheet(&sheet_names, selector).ok_or_else(|| match selector {
        SheetSelector::Named(name) => IngestError::SheetNotFound {
            path: path.to_path_buf(),
            sheet: name.clone(),
            available: sheet_names.clone(),
        },
        _ => parse_err("workbook has no sheets".to_string()),
    })?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| parse_err(e.to_string()))?;

    // calamine ranges begin at the first used cell, not at A1.
    let first_line = range.start().map_or(1, |(row, _)| row as usize + 1);

    let mut lines = range.rows().enumerate();
    let headers = lines
        .next()
        .map(|(_, cells)| {
            cells
                .iter()
                .map(|c| CellValue::from_calamine(c).as_trimmed_string())
                .collect()
        })
        .unwrap_or_default();

    let rows = lines
        .map(|(offset, cells)| GridRow {
            line: first_line + offset,
            cells: cells.iter().map(CellValue::from_calamine).collect(),
        })
        .filter(|row| !is_blank(row))
        .collect();

    Ok(SheetGrid {
        sheet_name,
        headers,
        rows,
    })
}

fn read_csv(path: &Path) -> Result<SheetGrid, IngestError> {
    let parse_err = |e: csv::Error| IngestError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(parse_err)?;

    let headers = reader
        .headers()
        .map_err(parse_err)?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = if i == 0 { h.trim_start_matches('\u{feff}') } else { h };
            h.trim().to_string()
        })
        .collect();

    let mut rows = Vec::new();
    for (offset, record) in reader.records().enumerate() {
        let record = record.map_err(parse_err)?;
        let line = record
            .position()
            .and_then(|p| usize::try_from(p.line()).ok())
            .unwrap_or(offset + 2);
        let row = GridRow {
            line,
            cells: record.iter().map(CellValue::from_text).collect(),
        };
        if !is_blank(&row) {
            rows.push(row);
        }
    }

    let sheet_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("csv")
        .to_string();

    Ok(SheetGrid {
        sheet_name,
        headers,
        rows,
    })
}

fn choose_sheet(available: &[String], selector: &SheetSelector) -> Option<String> {
    match selector {
        SheetSelector::Named(name) => available.iter().find(|s| *s == name).cloned(),
        SheetSelector::PreferNamed(name) => available
            .iter()
            .find(|s| *s == name)
            .or_else(|| available.first())
            .cloned(),
        SheetSelector::FirstAvailable => available.first().cloned(),
    }
}

fn is_blank(row: &GridRow) -> bool {
    row.cells.iter().all(CellValue::is_empty)
}
