//! Read and update operations for the `cards` table.

use chrono::{DateTime, Utc};
use holocron_core::{CardKey, VariantName, VariantPatch, VariantQuantities};
use sqlx::PgPool;

use crate::DbError;

pub(crate) const CARD_COLUMNS: &str = "id, card_key, set_code, card_number, name, subtitle, \
     rarity, card_type, aspects, cost, power, hp, normal, foil, hyperspace, foil_hyperspace, showcase, \
     organized_play, event_exclusive, prerelease_promo, organized_play_foil, standard_prestige, \
     foil_prestige, serialized_prestige, total_quantity, metadata_source, created_at, updated_at";

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `cards` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CardRow {
    pub id: i64,
    pub card_key: String,
    pub set_code: String,
    pub card_number: String,
    pub name: String,
    pub subtitle: Option<String>,
    pub rarity: Option<String>,
    pub card_type: Option<String>,
    pub aspects: Vec<String>,
    pub cost: Option<i32>,
    pub power: Option<i32>,
    pub hp: Option<i32>,
    pub normal: i32,
    pub foil: i32,
    pub hyperspace: i32,
    pub foil_hyperspace: i32,
    pub showcase: i32,
    pub organized_play: i32,
    pub event_exclusive: i32,
    pub prerelease_promo: i32,
    pub organized_play_foil: i32,
    pub standard_prestige: i32,
    pub foil_prestige: i32,
    pub serialized_prestige: i32,
    pub total_quantity: i32,
    pub metadata_source: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CardRow {
    /// Quantity column for `variant`.
    #[must_use]
    pub fn quantity(&self, variant: VariantName) -> i32 {
        match variant {
            VariantName::Normal => self.normal,
            VariantName::Foil => self.foil,
            VariantName::Hyperspace => self.hyperspace,
            VariantName::FoilHyperspace => self.foil_hyperspace,
            VariantName::Showcase => self.showcase,
            VariantName::OrganizedPlay => self.organized_play,
            VariantName::EventExclusive => self.event_exclusive,
            VariantName::PrereleasePromo => self.prerelease_promo,
            VariantName::OrganizedPlayFoil => self.organized_play_foil,
            VariantName::StandardPrestige => self.standard_prestige,
            VariantName::FoilPrestige => self.foil_prestige,
            VariantName::SerializedPrestige => self.serialized_prestige,
        }
    }

    /// All twelve quantity columns. The table's CHECK constraints keep them
    /// non-negative.
    #[must_use]
    pub fn variants(&self) -> VariantQuantities {
        VariantName::ALL
            .into_iter()
            .fold(VariantQuantities::default(), |acc, v| {
                acc.with(v, u32::try_from(self.quantity(v)).unwrap_or(0))
            })
    }
}

/// Input filters for card listing. Values are compared against stored
/// catalog terms, so callers normalize them first.
#[derive(Debug, Clone)]
pub struct CardListFilters<'a> {
    pub set_code: Option<&'a str>,
    pub card_type: Option<&'a str>,
    pub rarity: Option<&'a str>,
    /// Case-insensitive substring match on name or subtitle.
    pub search: Option<&'a str>,
    /// 1-based.
    pub page: i64,
    pub limit: i64,
}

impl Default for CardListFilters<'_> {
    fn default() -> Self {
        Self {
            set_code: None,
            card_type: None,
            rarity: None,
            search: None,
            page: 1,
            limit: 20,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CardPage {
    pub rows: Vec<CardRow>,
    pub total_items: i64,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Escapes `LIKE` metacharacters so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Returns one page of cards ordered by set code and card number, plus the
/// total number of rows matching the filters.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either query fails.
pub async fn list_cards(pool: &PgPool, filters: &CardListFilters<'_>) -> Result<CardPage, DbError> {
    const WHERE: &str = "WHERE ($1::TEXT IS NULL OR set_code = $1) \
           AND ($2::TEXT IS NULL OR card_type = $2) \
           AND ($3::TEXT IS NULL OR rarity = $3) \
           AND ($4::TEXT IS NULL OR name ILIKE $4 OR subtitle ILIKE $4)";

    let pattern = filters.search.map(|s| format!("%{}%", escape_like(s)));
    let offset = (filters.page.max(1) - 1).saturating_mul(filters.limit);

    let total_items = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM cards {WHERE}"))
        .bind(filters.set_code)
        .bind(filters.card_type)
        .bind(filters.rarity)
        .bind(pattern.as_deref())
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query_as::<_, CardRow>(&format!(
        "SELECT {CARD_COLUMNS} FROM cards {WHERE} \
         ORDER BY set_code, card_number \
         LIMIT $5 OFFSET $6"
    ))
    .bind(filters.set_code)
    .bind(filters.card_type)
    .bind(filters.rarity)
    .bind(pattern.as_deref())
    .bind(filters.limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(CardPage { rows, total_items })
}

/// Fetches a single card by canonical key.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no card has the key, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_card(pool: &PgPool, key: &CardKey) -> Result<CardRow, DbError> {
    sqlx::query_as::<_, CardRow>(&format!(
        "SELECT {CARD_COLUMNS} FROM cards WHERE card_key = $1"
    ))
    .bind(key.to_string())
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Applies a partial variant update and recomputes `total_quantity` from all
/// twelve variants.
///
/// The row is locked for the duration of the read-modify-write so concurrent
/// updates to the same card serialize.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] for an unknown key,
/// [`DbError::Validation`] if a quantity overflows the column, or
/// [`DbError::Sqlx`] if a query fails.
pub async fn update_card_variants(
    pool: &PgPool,
    key: &CardKey,
    patch: &VariantPatch,
) -> Result<CardRow, DbError> {
    let mut tx = pool.begin().await?;
    let card_key = key.to_string();

    let current = sqlx::query_as::<_, CardRow>(&format!(
        "SELECT {CARD_COLUMNS} FROM cards WHERE card_key = $1 FOR UPDATE"
    ))
    .bind(&card_key)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(DbError::NotFound)?;

    let merged = patch.apply(current.variants());

    let sql = format!(
        "UPDATE cards SET \
             normal = $2, foil = $3, hyperspace = $4, foil_hyperspace = $5, showcase = $6, \
             organized_play = $7, event_exclusive = $8, prerelease_promo = $9, \
             organized_play_foil = $10, standard_prestige = $11, foil_prestige = $12, \
             serialized_prestige = $13, total_quantity = $14, updated_at = NOW() \
         WHERE card_key = $1 \
         RETURNING {CARD_COLUMNS}"
    );
    let mut query = sqlx::query_as::<_, CardRow>(&sql).bind(&card_key);
    for variant in VariantName::ALL {
        query = query.bind(to_db_quantity(merged.get(variant))?);
    }
    let updated = query
        .bind(to_db_quantity(merged.total())?)
        .fetch_one(&mut *tx)
        .await
        .map_err(DbError::classify)?;

    tx.commit().await?;
    Ok(updated)
}

pub(crate) fn to_db_quantity(quantity: u32) -> Result<i32, DbError> {
    i32::try_from(quantity)
        .map_err(|_| DbError::Validation(format!("quantity {quantity} exceeds column range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("100%_done\\"), "100\\%\\_done\\\\");
        assert_eq!(escape_like("Vader"), "Vader");
    }

    #[test]
    fn oversized_quantity_is_a_validation_error() {
        assert!(matches!(
            to_db_quantity(u32::MAX),
            Err(DbError::Validation(_))
        ));
        assert_eq!(to_db_quantity(7).unwrap(), 7);
    }
}
