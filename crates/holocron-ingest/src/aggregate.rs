//! Merges inventory rows into one entry per canonical card key.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use holocron_core::{AggregatedInventoryEntry, CardKey, InventoryRow};

/// Row accounting for one aggregation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregationReport {
    /// Every row examined, including skipped ones.
    pub processed_row_count: usize,
    /// `invalid_key_count + zero_quantity_count`.
    pub skipped_row_count: usize,
    pub invalid_key_count: usize,
    pub zero_quantity_count: usize,
    pub unique_card_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    pub entries: BTreeMap<CardKey, AggregatedInventoryEntry>,
    pub report: AggregationReport,
}

impl Aggregation {
    #[must_use]
    pub fn into_entries(self) -> Vec<AggregatedInventoryEntry> {
        self.entries.into_values().collect()
    }
}

/// Sums variant quantities of all rows that resolve to the same key.
///
/// Rows whose key cannot be resolved, or whose quantities are all zero, are
/// skipped and counted. The resulting quantities do not depend on row order.
/// When rows disagree on the card name, the first non-empty one is kept.
pub fn aggregate<I>(rows: I) -> Aggregation
where
    I: IntoIterator<Item = InventoryRow>,
{
    let mut entries: BTreeMap<CardKey, AggregatedInventoryEntry> = BTreeMap::new();
    let mut report = AggregationReport::default();

    for row in rows {
        report.processed_row_count += 1;

        let key = match CardKey::resolve(&row.raw_set_label, &row.raw_card_number) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!(
                    line = row.line,
                    set = %row.raw_set_label,
                    number = %row.raw_card_number,
                    error = %e,
                    "skipping row with unresolvable card key"
                );
                report.invalid_key_count += 1;
                continue;
            }
        };

        if row.variants.is_empty() {
            tracing::debug!(line = row.line, key = %key, "skipping row with no quantity");
            report.zero_quantity_count += 1;
            continue;
        }

        match entries.entry(key) {
            Entry::Occupied(mut slot) => {
                let entry = slot.get_mut();
                entry.variants.add(&row.variants);
                if entry.name.is_empty() && !row.name.is_empty() {
                    entry.name = row.name;
                } else if !row.name.is_empty() && row.name != entry.name {
                    tracing::debug!(
                        key = %entry.key,
                        kept = %entry.name,
                        ignored = %row.name,
                        "conflicting card names for one key"
                    );
                }
                if entry.sheet_metadata.is_none() {
                    entry.sheet_metadata = row.sheet_metadata;
                }
            }
            Entry::Vacant(slot) => {
                let key = slot.key().clone();
                slot.insert(AggregatedInventoryEntry {
                    key,
                    name: row.name,
                    variants: row.variants,
                    sheet_metadata: row.sheet_metadata,
                });
            }
        }
    }

    report.skipped_row_count = report.invalid_key_count + report.zero_quantity_count;
    report.unique_card_count = entries.len();

    Aggregation { entries, report }
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod tests;
