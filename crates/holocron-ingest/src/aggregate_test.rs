use holocron_core::{SheetMetadata, VariantName, VariantQuantities};

use super::*;

fn row(set: &str, number: &str, name: &str, quantities: &[(VariantName, u32)]) -> InventoryRow {
    let mut variants = VariantQuantities::default();
    for (variant, q) in quantities {
        variants.set(*variant, *q);
    }
    InventoryRow {
        line: 0,
        raw_set_label: set.to_string(),
        raw_card_number: number.to_string(),
        name: name.to_string(),
        variants,
        sheet_metadata: None,
    }
}

fn key(set: &str, number: &str) -> CardKey {
    CardKey::resolve(set, number).unwrap()
}

#[test]
fn differently_spelled_rows_merge_into_one_entry() {
    let rows = vec![
        row("1SOR", "1", "Director Krennic", &[(VariantName::Normal, 2)]),
        row("sor", "001", "Director Krennic", &[(VariantName::Foil, 1)]),
    ];
    let result = aggregate(rows);

    assert_eq!(result.report.unique_card_count, 1);
    let entry = &result.entries[&key("sor", "1")];
    assert_eq!(entry.key.to_string(), "sor-001");
    assert_eq!(entry.variants.get(VariantName::Normal), 2);
    assert_eq!(entry.variants.get(VariantName::Foil), 1);
    assert_eq!(entry.total_quantity(), 3);
}

#[test]
fn all_zero_row_is_skipped_and_counted() {
    let rows = vec![
        row("SOR", "5", "Cartel Spacer", &[(VariantName::Normal, 1)]),
        row("SOR", "6", "Green Squadron A-Wing", &[]),
    ];
    let result = aggregate(rows);

    assert_eq!(result.report.processed_row_count, 2);
    assert_eq!(result.report.zero_quantity_count, 1);
    assert_eq!(result.report.skipped_row_count, 1);
    assert_eq!(result.report.unique_card_count, 1);
    assert!(!result.entries.contains_key(&key("sor", "6")));
}

#[test]
fn unresolvable_keys_are_skipped_and_counted() {
    let rows = vec![
        row("", "5", "No Set", &[(VariantName::Normal, 1)]),
        row("SOR", " ", "No Number", &[(VariantName::Normal, 1)]),
        row("SOR", "7", "Fine", &[(VariantName::Normal, 1)]),
    ];
    let result = aggregate(rows);

    assert_eq!(result.report.invalid_key_count, 2);
    assert_eq!(result.report.skipped_row_count, 2);
    assert_eq!(result.report.unique_card_count, 1);
}

#[test]
fn no_entry_has_zero_total() {
    let rows = vec![
        row("SOR", "1", "A", &[(VariantName::Normal, 0)]),
        row("SOR", "2", "B", &[(VariantName::Showcase, 1)]),
        row("SHD", "3", "C", &[]),
    ];
    let result = aggregate(rows);
    assert!(result.entries.values().all(|e| e.total_quantity() > 0));
}

#[test]
fn aggregation_does_not_depend_on_row_order() {
    let rows = vec![
        row("1SOR", "1", "Krennic", &[(VariantName::Normal, 2)]),
        row("SHD", "12", "Cad Bane", &[(VariantName::Hyperspace, 1)]),
        row("sor", "001", "Krennic", &[(VariantName::Foil, 1), (VariantName::Normal, 1)]),
        row("2SHD", "012", "Cad Bane", &[(VariantName::SerializedPrestige, 1)]),
        row("TWI", "40", "Zero", &[]),
    ];

    let forward = aggregate(rows.clone());
    let mut reversed_rows = rows.clone();
    reversed_rows.reverse();
    let reversed = aggregate(reversed_rows);
    let mut rotated_rows = rows;
    rotated_rows.rotate_left(2);
    let rotated = aggregate(rotated_rows);

    assert_eq!(forward, reversed);
    assert_eq!(forward, rotated);
}

#[test]
fn quantities_are_conserved() {
    let rows = vec![
        row("1SOR", "1", "Krennic", &[(VariantName::Normal, 2)]),
        row("sor", "1", "Krennic", &[(VariantName::Foil, 3)]),
        row("SHD", "1", "Bane", &[(VariantName::Normal, 4), (VariantName::FoilPrestige, 1)]),
        row("", "1", "Bad", &[(VariantName::Normal, 9)]),
    ];
    let input_total: u32 = rows
        .iter()
        .filter(|r| CardKey::resolve(&r.raw_set_label, &r.raw_card_number).is_ok())
        .map(|r| r.variants.total())
        .sum();

    let result = aggregate(rows);
    let output_total: u32 = result.entries.values().map(|e| e.total_quantity()).sum();
    assert_eq!(input_total, output_total);
    assert_eq!(output_total, 10);
}

#[test]
fn first_non_empty_name_and_metadata_are_kept() {
    let mut with_metadata = row("SOR", "3", "Later Name", &[(VariantName::Normal, 1)]);
    with_metadata.sheet_metadata = Some(SheetMetadata {
        rarity: Some("rara".to_string()),
        ..SheetMetadata::default()
    });
    let rows = vec![
        row("SOR", "3", "", &[(VariantName::Normal, 1)]),
        row("SOR", "3", "Chewbacca", &[(VariantName::Normal, 1)]),
        with_metadata,
    ];
    let result = aggregate(rows);
    let entry = &result.entries[&key("sor", "3")];

    assert_eq!(entry.name, "Chewbacca");
    assert_eq!(
        entry.sheet_metadata.as_ref().and_then(|m| m.rarity.as_deref()),
        Some("rara")
    );
    assert_eq!(entry.total_quantity(), 3);
}
