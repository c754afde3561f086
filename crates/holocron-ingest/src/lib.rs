//! Inventory spreadsheet ingestion: read, map headers, extract rows, aggregate.

pub mod aggregate;
pub mod cell;
pub mod error;
pub mod headers;
pub mod rows;
pub mod sheet;

use std::path::Path;

use holocron_core::InventoryRow;

pub use aggregate::{aggregate, Aggregation, AggregationReport};
pub use cell::CellValue;
pub use error::IngestError;
pub use headers::{build_field_map, normalize_header, Field, FieldMap, DEFAULT_ALLOW_LIST};
pub use rows::extract_rows;
pub use sheet::{read_sheet, GridRow, SheetGrid, SheetSelector};

/// Rows read from one inventory file.
#[derive(Debug, Clone)]
pub struct InventorySheet {
    pub sheet_name: String,
    pub rows: Vec<InventoryRow>,
    /// Headers that were not recognised and were ignored.
    pub dropped_headers: Vec<String>,
}

/// Reads an inventory export and returns its rows in canonical field form.
///
/// # Errors
///
/// Returns [`IngestError::MissingRequiredColumns`] before any row is
/// processed when the sheet lacks `set`, `base_card_id` or `name`, and
/// propagates reader errors from [`read_sheet`].
pub fn read_inventory(path: &Path, selector: &SheetSelector) -> Result<InventorySheet, IngestError> {
    let grid = read_sheet(path, selector)?;
    let map = build_field_map(&grid.headers, DEFAULT_ALLOW_LIST);

    let missing = map.missing_required();
    if !missing.is_empty() {
        return Err(IngestError::MissingRequiredColumns { missing });
    }

    if !map.dropped().is_empty() {
        tracing::info!(
            sheet = %grid.sheet_name,
            dropped = ?map.dropped(),
            "ignoring unrecognised columns"
        );
    }

    let rows = extract_rows(&grid, &map);
    tracing::info!(
        path = %path.display(),
        sheet = %grid.sheet_name,
        rows = rows.len(),
        "inventory sheet loaded"
    );

    Ok(InventorySheet {
        sheet_name: grid.sheet_name,
        rows,
        dropped_headers: map.dropped().to_vec(),
    })
}
