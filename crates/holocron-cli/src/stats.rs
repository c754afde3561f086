//! `holocron stats`: print collection completion.

use std::fmt::Write as _;
use std::path::Path;

use holocron_core::{CollectionStatistics, GroupStatistics, StatsOverview};

use crate::import::sheet_selector;

/// Prints statistics over every stored card.
///
/// # Errors
///
/// Returns an error if the statistics query fails.
pub(crate) async fn run_stats(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let stats = holocron_db::collection_statistics(pool).await?;
    if stats.overview.total_cards == 0 {
        println!("no cards stored; run `holocron import` first");
        return Ok(());
    }
    print!("{}", render_statistics(&stats));
    Ok(())
}

/// Prints statistics for an inventory file without touching the database.
/// Rarity comes from the spreadsheet's own columns when it has them.
///
/// # Errors
///
/// Returns an error if the file cannot be read or lacks required columns.
pub(crate) fn run_stats_from_file(path: &Path, sheet: Option<&str>) -> anyhow::Result<()> {
    let inventory = holocron_ingest::read_inventory(path, &sheet_selector(sheet))?;
    let aggregation = holocron_ingest::aggregate(inventory.rows);
    let outcome = holocron_enrich::join(aggregation.into_entries(), None);
    print!(
        "{}",
        render_statistics(&CollectionStatistics::from_records(&outcome.records))
    );
    Ok(())
}

pub(crate) fn render_statistics(stats: &CollectionStatistics) -> String {
    let o = &stats.overview;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} of {} cards owned ({}%), {} physical cards",
        o.owned_cards, o.total_cards, o.completion_percentage, o.total_physical_cards
    );

    render_groups(&mut out, "SET", &stats.by_set);
    render_groups(&mut out, "RARITY", &stats.by_rarity);
    out
}

fn render_groups(out: &mut String, label: &str, groups: &[GroupStatistics]) {
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{label:<16}{:>8}{:>8}{:>10}{:>10}",
        "TOTAL", "OWNED", "PHYSICAL", "COMPLETE"
    );
    for group in groups {
        let StatsOverview {
            total_cards,
            owned_cards,
            total_physical_cards,
            completion_percentage,
        } = &group.counts;
        let _ = writeln!(
            out,
            "{:<16}{total_cards:>8}{owned_cards:>8}{total_physical_cards:>10}{:>10}",
            group.group,
            format!("{completion_percentage}%"),
        );
    }
}

#[cfg(test)]
mod tests {
    use holocron_core::{
        CardKey, CatalogRecord, EnrichedCardMetadata, MetadataSource, Rarity, Translation,
        VariantName, VariantQuantities,
    };

    use super::*;

    fn record(set: &str, number: &str, rarity: Option<Rarity>, normal: u32) -> CatalogRecord {
        CatalogRecord {
            key: CardKey::resolve(set, number).unwrap(),
            name: format!("{set} {number}"),
            variants: VariantQuantities::default().with(VariantName::Normal, normal),
            metadata: EnrichedCardMetadata {
                rarity: rarity.map(Translation::Known),
                ..EnrichedCardMetadata::default()
            },
            metadata_source: MetadataSource::External,
        }
    }

    #[test]
    fn renders_overview_and_groups() {
        let stats = CollectionStatistics::from_records(&[
            record("sor", "1", Some(Rarity::Common), 3),
            record("sor", "2", Some(Rarity::Common), 0),
            record("shd", "9", None, 1),
        ]);
        let text = render_statistics(&stats);

        assert!(text.starts_with("2 of 3 cards owned (66.7%), 4 physical cards"));
        assert!(text.contains("SET"));
        assert!(text.contains("RARITY"));
        let sor_line = text
            .lines()
            .find(|l| l.starts_with("sor"))
            .expect("sor row");
        assert!(sor_line.contains("50.0%"), "got: {sor_line}");
        assert!(text.lines().any(|l| l.starts_with("unknown")));
    }

    #[test]
    fn empty_statistics_render_zero_percent() {
        let text = render_statistics(&CollectionStatistics::from_records(&[]));
        assert!(text.starts_with("0 of 0 cards owned (0.0%)"));
    }
}
