//! Collection statistics computed from the `cards` table.

use holocron_core::CollectionStatistics;
use sqlx::PgPool;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
struct StatsGroupRow {
    set_code: String,
    rarity: Option<String>,
    total_cards: i64,
    owned_cards: i64,
    total_physical_cards: i64,
}

/// Computes overview, per-set and per-rarity statistics over every card,
/// owned or not.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn collection_statistics(pool: &PgPool) -> Result<CollectionStatistics, DbError> {
    let rows = sqlx::query_as::<_, StatsGroupRow>(
        "SELECT \
             set_code, \
             rarity, \
             COUNT(*) AS total_cards, \
             COUNT(*) FILTER (WHERE total_quantity > 0) AS owned_cards, \
             COALESCE(SUM(total_quantity), 0)::BIGINT AS total_physical_cards \
         FROM cards \
         GROUP BY set_code, rarity",
    )
    .fetch_all(pool)
    .await?;

    let non_negative = |v: i64| u64::try_from(v).unwrap_or(0);
    Ok(CollectionStatistics::from_groups(rows.iter().map(|r| {
        (
            r.set_code.as_str(),
            r.rarity.as_deref(),
            non_negative(r.total_cards),
            non_negative(r.owned_cards),
            non_negative(r.total_physical_cards),
        )
    })))
}
