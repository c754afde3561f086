//! Joins aggregated inventory with external card metadata.

use std::collections::HashSet;

use holocron_core::{
    AggregatedInventoryEntry, CardKey, CatalogRecord, EnrichedCardMetadata, MetadataSource,
    VariantQuantities,
};

use crate::index::CardIndex;
use crate::translate::translate_card;

/// A vocabulary value that had no catalog term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UntranslatedValue {
    pub key: CardKey,
    /// `field=value`, e.g. `rarity=starter`.
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct JoinOutcome {
    pub records: Vec<CatalogRecord>,
    /// Entries found in the external index.
    pub matched: usize,
    /// Entries not found in the external index (including those that fell
    /// back to spreadsheet metadata).
    pub unmatched: usize,
    /// Unmatched entries that used spreadsheet metadata instead.
    pub from_sheet: usize,
    pub untranslated: Vec<UntranslatedValue>,
}

/// Builds one catalog record per aggregated entry.
///
/// Metadata precedence: external index, then the spreadsheet's own columns,
/// then empty. With `index = None` (enrichment skipped or unavailable) every
/// entry counts as unmatched.
#[must_use]
pub fn join<I>(entries: I, index: Option<&CardIndex>) -> JoinOutcome
where
    I: IntoIterator<Item = AggregatedInventoryEntry>,
{
    let mut outcome = JoinOutcome::default();

    for mut entry in entries {
        let external = index.and_then(|idx| idx.get(&entry.key));
        let (metadata, source) = if let Some(card) = external {
            outcome.matched += 1;
            if entry.name.is_empty() {
                entry.name.clone_from(&card.name);
            }
            (translate_card(card), MetadataSource::External)
        } else {
            outcome.unmatched += 1;
            match entry.sheet_metadata.as_ref().filter(|m| !m.is_empty()) {
                Some(sheet) => {
                    outcome.from_sheet += 1;
                    (
                        EnrichedCardMetadata::from_sheet(sheet),
                        MetadataSource::Spreadsheet,
                    )
                }
                None => (EnrichedCardMetadata::default(), MetadataSource::None),
            }
        };

        record_untranslated(&mut outcome.untranslated, &entry.key, &metadata);
        outcome
            .records
            .push(CatalogRecord::from_entry(entry, metadata, source));
    }

    if !outcome.untranslated.is_empty() {
        tracing::warn!(
            count = outcome.untranslated.len(),
            "metadata values without a catalog term"
        );
    }
    outcome
}

/// Appends a zero-quantity record for every indexed card not already in
/// `outcome.records`, so unowned cards count toward collection totals.
///
/// Returns the number of reference records added.
pub fn seed_reference(outcome: &mut JoinOutcome, index: &CardIndex) -> usize {
    let owned: HashSet<CardKey> = outcome.records.iter().map(|r| r.key.clone()).collect();

    let mut missing: Vec<(&CardKey, _)> = index
        .iter()
        .filter(|(key, _)| !owned.contains(*key))
        .collect();
    missing.sort_by(|a, b| a.0.cmp(b.0));

    let added = missing.len();
    for (key, card) in missing {
        let metadata = translate_card(card);
        record_untranslated(&mut outcome.untranslated, key, &metadata);
        outcome.records.push(CatalogRecord {
            key: key.clone(),
            name: card.name.clone(),
            variants: VariantQuantities::default(),
            metadata,
            metadata_source: MetadataSource::External,
        });
    }
    tracing::info!(added, "seeded reference cards");
    added
}

fn record_untranslated(
    out: &mut Vec<UntranslatedValue>,
    key: &CardKey,
    metadata: &EnrichedCardMetadata,
) {
    for value in metadata.untranslated() {
        tracing::warn!(key = %key, value = %value, "untranslated metadata value");
        out.push(UntranslatedValue {
            key: key.clone(),
            value,
        });
    }
}

#[cfg(test)]
#[path = "join_test.rs"]
mod tests;
