use holocron_core::{InventoryRow, SheetMetadata, VariantQuantities};

use crate::headers::{Field, FieldMap};
use crate::sheet::{GridRow, SheetGrid};

/// Turns grid rows into [`InventoryRow`]s using the sheet's field map.
///
/// Rows are passed through even when their key parts are blank; key
/// resolution and counting happen in the aggregator.
#[must_use]
pub fn extract_rows(grid: &SheetGrid, map: &FieldMap) -> Vec<InventoryRow> {
    grid.rows.iter().map(|row| extract_row(row, map)).collect()
}

fn extract_row(row: &GridRow, map: &FieldMap) -> InventoryRow {
    let text = |field: Field| {
        map.column(field)
            .map(|c| row.cell(c).as_trimmed_string())
            .unwrap_or_default()
    };

    let mut variants = VariantQuantities::default();
    for (column, field) in map.columns() {
        if let Field::Variant(variant) = field {
            variants.set(variant, row.cell(column).as_non_negative_int());
        }
    }

    let sheet_metadata = if map.has_metadata() {
        let optional_text = |field: Field| Some(text(field)).filter(|s| !s.is_empty());
        let optional_int =
            |field: Field| map.column(field).and_then(|c| row.cell(c).as_optional_int());
        let metadata = SheetMetadata {
            rarity: optional_text(Field::Rarity),
            card_type: optional_text(Field::CardType),
            aspects: split_aspects(&text(Field::Aspects)),
            cost: optional_int(Field::Cost),
            power: optional_int(Field::Power),
            hp: optional_int(Field::Hp),
        };
        (!metadata.is_empty()).then_some(metadata)
    } else {
        None
    };

    InventoryRow {
        line: row.line,
        raw_set_label: text(Field::Set),
        raw_card_number: text(Field::BaseCardId),
        name: text(Field::Name),
        variants,
        sheet_metadata,
    }
}

fn split_aspects(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use holocron_core::VariantName;

    use super::*;
    use crate::cell::CellValue;
    use crate::headers::{build_field_map, DEFAULT_ALLOW_LIST};

    fn grid(headers: &[&str], rows: Vec<Vec<CellValue>>) -> SheetGrid {
        SheetGrid {
            sheet_name: "Data".to_string(),
            headers: headers.iter().map(|h| (*h).to_string()).collect(),
            rows: rows
                .into_iter()
                .enumerate()
                .map(|(i, cells)| GridRow { line: i + 2, cells })
                .collect(),
        }
    }

    #[test]
    fn reads_keys_names_and_quantities() {
        let g = grid(
            &["Set", "Base Card Id", "Name", "Normal", "Foil & Hyperspace"],
            vec![vec![
                CellValue::Text("1SOR".into()),
                CellValue::Number(1.0),
                CellValue::Text("Luke Skywalker".into()),
                CellValue::Number(2.0),
                CellValue::Text("1".into()),
            ]],
        );
        let map = build_field_map(&g.headers, DEFAULT_ALLOW_LIST);
        let rows = extract_rows(&g, &map);

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.line, 2);
        assert_eq!(row.raw_set_label, "1SOR");
        assert_eq!(row.raw_card_number, "1");
        assert_eq!(row.name, "Luke Skywalker");
        assert_eq!(row.variants.get(VariantName::Normal), 2);
        assert_eq!(row.variants.get(VariantName::FoilHyperspace), 1);
        assert_eq!(row.variants.total(), 3);
        assert!(row.sheet_metadata.is_none());
    }

    #[test]
    fn reads_enriched_metadata_columns() {
        let g = grid(
            &["Set", "Base Card Id", "Name", "Normal", "Rarity", "Type", "Aspects", "Cost"],
            vec![vec![
                CellValue::Text("SOR".into()),
                CellValue::Text("10".into()),
                CellValue::Text("Darth Vader".into()),
                CellValue::Number(1.0),
                CellValue::Text("legendaria".into()),
                CellValue::Text("unidad_lider".into()),
                CellValue::Text("Aggression, Villainy".into()),
                CellValue::Empty,
            ]],
        );
        let map = build_field_map(&g.headers, DEFAULT_ALLOW_LIST);
        let rows = extract_rows(&g, &map);
        let metadata = rows[0].sheet_metadata.as_ref().expect("metadata");

        assert_eq!(metadata.rarity.as_deref(), Some("legendaria"));
        assert_eq!(metadata.card_type.as_deref(), Some("unidad_lider"));
        assert_eq!(metadata.aspects, vec!["Aggression", "Villainy"]);
        assert_eq!(metadata.cost, None);
    }

    #[test]
    fn blank_metadata_cells_yield_no_metadata() {
        let g = grid(
            &["Set", "Base Card Id", "Name", "Rarity"],
            vec![vec![
                CellValue::Text("SOR".into()),
                CellValue::Text("10".into()),
                CellValue::Text("Darth Vader".into()),
                CellValue::Empty,
            ]],
        );
        let map = build_field_map(&g.headers, DEFAULT_ALLOW_LIST);
        assert!(extract_rows(&g, &map)[0].sheet_metadata.is_none());
    }
}
