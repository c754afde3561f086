//! Batched upsert of catalog records keyed by `card_key`.
//!
//! Each batch is written in one transaction. When a batch fails it is rolled
//! back and its records are retried one by one, so a single bad record costs
//! only itself. Every input record ends up counted exactly once as inserted,
//! updated or failed.

use std::future::Future;

use holocron_core::{CardKey, CatalogRecord, VariantName};
use sqlx::PgPool;

use crate::cards::to_db_quantity;
use crate::DbError;

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// A record that could not be written, with the reason reported to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedRecord {
    pub key: CardKey,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpsertReport {
    pub inserted: usize,
    pub updated: usize,
    pub failed: Vec<FailedRecord>,
}

impl UpsertReport {
    /// Records accounted for; equals the input count after [`write_catalog`].
    #[must_use]
    pub fn total(&self) -> usize {
        self.inserted + self.updated + self.failed.len()
    }

    fn count(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Updated => self.updated += 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Store abstraction
// ---------------------------------------------------------------------------

/// Persistence seam for catalog writes.
pub trait CardStore {
    /// Upserts every record atomically; on error nothing is written.
    fn upsert_batch(
        &self,
        records: &[CatalogRecord],
    ) -> impl Future<Output = Result<Vec<UpsertOutcome>, DbError>> + Send;

    fn upsert_one(
        &self,
        record: &CatalogRecord,
    ) -> impl Future<Output = Result<UpsertOutcome, DbError>> + Send;

    /// Deletes every card. Returns the number of rows removed.
    fn clear(&self) -> impl Future<Output = Result<u64, DbError>> + Send;
}

/// Writes `records` in batches of `batch_size`, falling back to per-record
/// writes for any batch that fails.
///
/// A record whose individual write hits a unique-key race is retried once.
pub async fn write_catalog<S: CardStore>(
    store: &S,
    records: &[CatalogRecord],
    batch_size: usize,
) -> UpsertReport {
    let mut report = UpsertReport::default();

    for batch in records.chunks(batch_size.max(1)) {
        match store.upsert_batch(batch).await {
            Ok(outcomes) => {
                for outcome in outcomes {
                    report.count(outcome);
                }
            }
            Err(e) => {
                tracing::warn!(
                    batch_len = batch.len(),
                    error = %e,
                    "batch upsert failed; retrying records individually"
                );
                for record in batch {
                    write_one(store, record, &mut report).await;
                }
            }
        }
    }

    tracing::info!(
        inserted = report.inserted,
        updated = report.updated,
        failed = report.failed.len(),
        "catalog write finished"
    );
    report
}

async fn write_one<S: CardStore>(store: &S, record: &CatalogRecord, report: &mut UpsertReport) {
    let mut result = store.upsert_one(record).await;
    if matches!(&result, Err(e) if e.is_unique_violation()) {
        tracing::debug!(key = %record.key, "unique-key race; retrying once");
        result = store.upsert_one(record).await;
    }

    match result {
        Ok(outcome) => report.count(outcome),
        Err(e) => {
            tracing::warn!(key = %record.key, error = %e, "card record failed");
            report.failed.push(FailedRecord {
                key: record.key.clone(),
                reason: e.to_string(),
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Postgres implementation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PgCardStore {
    pool: PgPool,
}

impl PgCardStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const UPSERT_SQL: &str = "INSERT INTO cards \
         (card_key, set_code, card_number, name, subtitle, rarity, card_type, aspects, cost, \
          power, hp, normal, foil, hyperspace, foil_hyperspace, showcase, organized_play, event_exclusive, \
          prerelease_promo, organized_play_foil, standard_prestige, foil_prestige, \
          serialized_prestige, total_quantity, metadata_source) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, \
             $19, $20, $21, $22, $23, $24, $25) \
     ON CONFLICT (card_key) DO UPDATE SET \
         name                = EXCLUDED.name, \
         subtitle            = EXCLUDED.subtitle, \
         rarity              = EXCLUDED.rarity, \
         card_type           = EXCLUDED.card_type, \
         aspects             = EXCLUDED.aspects, \
         cost                = EXCLUDED.cost, \
         power               = EXCLUDED.power, \
         hp                  = EXCLUDED.hp, \
         normal              = EXCLUDED.normal, \
         foil                = EXCLUDED.foil, \
         hyperspace          = EXCLUDED.hyperspace, \
         foil_hyperspace     = EXCLUDED.foil_hyperspace, \
         showcase            = EXCLUDED.showcase, \
         organized_play      = EXCLUDED.organized_play, \
         event_exclusive     = EXCLUDED.event_exclusive, \
         prerelease_promo    = EXCLUDED.prerelease_promo, \
         organized_play_foil = EXCLUDED.organized_play_foil, \
         standard_prestige   = EXCLUDED.standard_prestige, \
         foil_prestige       = EXCLUDED.foil_prestige, \
         serialized_prestige = EXCLUDED.serialized_prestige, \
         total_quantity      = EXCLUDED.total_quantity, \
         metadata_source     = EXCLUDED.metadata_source, \
         updated_at          = NOW() \
     RETURNING (xmax = 0) AS is_new";

async fn upsert_record<'e, E>(executor: E, record: &CatalogRecord) -> Result<UpsertOutcome, DbError>
where
    E: sqlx::PgExecutor<'e>,
{
    let metadata = &record.metadata;
    let aspects: Vec<String> = metadata
        .aspects
        .iter()
        .map(|a| a.as_catalog_str().to_string())
        .collect();

    let mut query = sqlx::query_scalar::<_, bool>(UPSERT_SQL)
        .bind(record.key.to_string())
        .bind(record.key.set_code())
        .bind(record.key.card_number())
        .bind(&record.name)
        .bind(metadata.subtitle.as_deref())
        .bind(metadata.rarity.as_ref().map(|r| r.as_catalog_str()))
        .bind(metadata.card_type.as_ref().map(|t| t.as_catalog_str()))
        .bind(aspects)
        .bind(metadata.cost.map(to_db_quantity).transpose()?)
        .bind(metadata.power.map(to_db_quantity).transpose()?)
        .bind(metadata.hp.map(to_db_quantity).transpose()?);
    for variant in VariantName::ALL {
        query = query.bind(to_db_quantity(record.variants.get(variant))?);
    }
    let is_new = query
        .bind(to_db_quantity(record.total_quantity())?)
        .bind(record.metadata_source.as_str())
        .fetch_one(executor)
        .await
        .map_err(DbError::classify)?;

    Ok(if is_new {
        UpsertOutcome::Inserted
    } else {
        UpsertOutcome::Updated
    })
}

impl CardStore for PgCardStore {
    async fn upsert_batch(&self, records: &[CatalogRecord]) -> Result<Vec<UpsertOutcome>, DbError> {
        let mut tx = self.pool.begin().await?;
        let mut outcomes = Vec::with_capacity(records.len());
        for record in records {
            outcomes.push(upsert_record(&mut *tx, record).await?);
        }
        tx.commit().await?;
        Ok(outcomes)
    }

    async fn upsert_one(&self, record: &CatalogRecord) -> Result<UpsertOutcome, DbError> {
        upsert_record(&self.pool, record).await
    }

    async fn clear(&self) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM cards").execute(&self.pool).await?;
        tracing::info!(deleted = result.rows_affected(), "card catalog cleared");
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
#[path = "catalog_writer_test.rs"]
mod tests;
