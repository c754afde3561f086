//! End-to-end tests for reading and aggregating inventory exports.
//!
//! Fixtures are written as CSV into temp files so the tests exercise the same
//! header mapping and aggregation path a real import uses.

use std::io::Write;

use holocron_core::{CardKey, VariantName};
use holocron_ingest::{aggregate, read_inventory, IngestError, SheetSelector};

fn csv_fixture(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("create temp csv");
    file.write_all(contents.as_bytes()).expect("write csv");
    file.flush().expect("flush csv");
    file
}

#[test]
fn inventory_with_mixed_spellings_aggregates_to_canonical_keys() {
    let file = csv_fixture(
        "Set,Base Card Id,Name,Normal,Foil,Foil & Hyperspace,Notes\n\
         1SOR,1,Director Krennic,2,,,binder 3\n\
         sor,001,Director Krennic,,1,,\n\
         2SHD,45,Cad Bane,0,0,0,\n\
         ,,,,,,\n\
         SHD,46,Bo-Katan Kryze,1,,1,\n",
    );

    let sheet = read_inventory(file.path(), &SheetSelector::default()).expect("read inventory");
    assert_eq!(sheet.rows.len(), 4, "blank row is dropped by the reader");
    assert_eq!(sheet.dropped_headers, vec!["Notes".to_string()]);

    let result = aggregate(sheet.rows);
    assert_eq!(result.report.processed_row_count, 4);
    assert_eq!(result.report.zero_quantity_count, 1);
    assert_eq!(result.report.unique_card_count, 2);

    let krennic = &result.entries[&CardKey::resolve("sor", "1").unwrap()];
    assert_eq!(krennic.variants.get(VariantName::Normal), 2);
    assert_eq!(krennic.variants.get(VariantName::Foil), 1);
    assert_eq!(krennic.total_quantity(), 3);

    let bo_katan = &result.entries[&CardKey::resolve("shd", "46").unwrap()];
    assert_eq!(bo_katan.variants.get(VariantName::FoilHyperspace), 1);
}

#[test]
fn missing_required_columns_abort_before_rows() {
    let file = csv_fixture("Set,Name,Normal\nSOR,Krennic,1\n");

    let err = read_inventory(file.path(), &SheetSelector::default()).unwrap_err();
    match err {
        IngestError::MissingRequiredColumns { missing } => {
            assert_eq!(missing, vec!["base_card_id".to_string()]);
        }
        other => panic!("expected MissingRequiredColumns, got {other:?}"),
    }
}

#[test]
fn missing_file_is_reported() {
    let err = read_inventory(
        std::path::Path::new("./no-such-inventory.xlsx"),
        &SheetSelector::default(),
    )
    .unwrap_err();
    assert!(matches!(err, IngestError::FileNotFound { .. }));
}
