//! Collection completion statistics.
//!
//! Statistics are derived on read and never stored. The database layer feeds
//! grouped counts in through [`CollectionStatistics::from_groups`]; the CLI
//! summarises in-memory records with [`CollectionStatistics::from_records`].
//! Both paths share the same accumulation so the numbers agree.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog::CatalogRecord;

/// Group label for records without a rarity.
pub const UNKNOWN_RARITY: &str = "unknown";

/// `owned / total * 100` with one decimal place; `"0.0"` for an empty total.
#[must_use]
pub fn completion_percentage(owned: u64, total: u64) -> String {
    if total == 0 {
        return "0.0".to_string();
    }
    #[allow(clippy::cast_precision_loss)]
    let pct = owned as f64 / total as f64 * 100.0;
    format!("{pct:.1}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsOverview {
    pub total_cards: u64,
    pub owned_cards: u64,
    pub total_physical_cards: u64,
    pub completion_percentage: String,
}

impl StatsOverview {
    fn from_counts(counts: Counts) -> Self {
        Self {
            total_cards: counts.total,
            owned_cards: counts.owned,
            total_physical_cards: counts.physical,
            completion_percentage: completion_percentage(counts.owned, counts.total),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupStatistics {
    /// Set code in `by_set`, rarity term in `by_rarity`.
    pub group: String,
    pub counts: StatsOverview,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SetEntry<'a> {
    set_code: &'a str,
    #[serde(flatten)]
    counts: &'a StatsOverview,
}

#[derive(Serialize)]
struct RarityEntry<'a> {
    rarity: &'a str,
    #[serde(flatten)]
    counts: &'a StatsOverview,
}

/// `{overview, bySet, byRarity}` as served by `GET /cards/stats`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionStatistics {
    pub overview: StatsOverview,
    pub by_set: Vec<GroupStatistics>,
    pub by_rarity: Vec<GroupStatistics>,
}

impl CollectionStatistics {
    /// Builds statistics from per-(set, rarity) counts.
    ///
    /// Each item is `(set_code, rarity, total_cards, owned_cards, physical_cards)`.
    #[must_use]
    pub fn from_groups<'a, I>(groups: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>, u64, u64, u64)>,
    {
        let mut acc = Accumulator::default();
        for (set_code, rarity, total, owned, physical) in groups {
            acc.add(
                set_code,
                rarity,
                Counts {
                    total,
                    owned,
                    physical,
                },
            );
        }
        acc.finish()
    }

    /// Builds statistics by counting catalog records directly.
    #[must_use]
    pub fn from_records(records: &[CatalogRecord]) -> Self {
        let mut acc = Accumulator::default();
        for record in records {
            let physical = u64::from(record.total_quantity());
            acc.add(
                record.key.set_code(),
                record
                    .metadata
                    .rarity
                    .as_ref()
                    .map(crate::vocabulary::Translation::as_catalog_str),
                Counts {
                    total: 1,
                    owned: u64::from(physical > 0),
                    physical,
                },
            );
        }
        acc.finish()
    }
}

impl Serialize for CollectionStatistics {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let by_set: Vec<SetEntry<'_>> = self
            .by_set
            .iter()
            .map(|g| SetEntry {
                set_code: &g.group,
                counts: &g.counts,
            })
            .collect();
        let by_rarity: Vec<RarityEntry<'_>> = self
            .by_rarity
            .iter()
            .map(|g| RarityEntry {
                rarity: &g.group,
                counts: &g.counts,
            })
            .collect();

        let mut state = serializer.serialize_struct("CollectionStatistics", 3)?;
        state.serialize_field("overview", &self.overview)?;
        state.serialize_field("bySet", &by_set)?;
        state.serialize_field("byRarity", &by_rarity)?;
        state.end()
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Counts {
    total: u64,
    owned: u64,
    physical: u64,
}

impl Counts {
    fn add(&mut self, other: Counts) {
        self.total += other.total;
        self.owned += other.owned;
        self.physical += other.physical;
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    overview: Counts,
    by_set: BTreeMap<String, Counts>,
    by_rarity: BTreeMap<String, Counts>,
}

impl Accumulator {
    fn add(&mut self, set_code: &str, rarity: Option<&str>, counts: Counts) {
        self.overview.add(counts);
        self.by_set
            .entry(set_code.to_string())
            .or_default()
            .add(counts);
        self.by_rarity
            .entry(rarity.unwrap_or(UNKNOWN_RARITY).to_string())
            .or_default()
            .add(counts);
    }

    fn finish(self) -> CollectionStatistics {
        let groups = |map: BTreeMap<String, Counts>| -> Vec<GroupStatistics> {
            map.into_iter()
                .map(|(group, counts)| GroupStatistics {
                    group,
                    counts: StatsOverview::from_counts(counts),
                })
                .collect()
        };
        CollectionStatistics {
            overview: StatsOverview::from_counts(self.overview),
            by_set: groups(self.by_set),
            by_rarity: groups(self.by_rarity),
        }
    }
}
