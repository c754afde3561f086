//! Database operations for the `import_runs` ledger.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const RUN_COLUMNS: &str = "id, public_id, source_file, trigger_source, status, started_at, \
     completed_at, rows_processed, rows_skipped, unique_cards, metadata_matched, \
     metadata_unmatched, records_inserted, records_updated, records_failed, error_message, \
     created_at";

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `import_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ImportRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub source_file: String,
    pub trigger_source: String,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub rows_processed: i32,
    pub rows_skipped: i32,
    pub unique_cards: i32,
    pub metadata_matched: i32,
    pub metadata_unmatched: i32,
    pub records_inserted: i32,
    pub records_updated: i32,
    pub records_failed: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Counters recorded when a run finishes, successfully or not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportRunCounters {
    pub rows_processed: i32,
    pub rows_skipped: i32,
    pub unique_cards: i32,
    pub metadata_matched: i32,
    pub metadata_unmatched: i32,
    pub records_inserted: i32,
    pub records_updated: i32,
    pub records_failed: i32,
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Creates a new import run in `queued` status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_import_run(
    pool: &PgPool,
    source_file: &str,
    trigger_source: &str,
) -> Result<ImportRunRow, DbError> {
    let row = sqlx::query_as::<_, ImportRunRow>(&format!(
        "INSERT INTO import_runs (public_id, source_file, trigger_source, status) \
         VALUES ($1, $2, $3, 'queued') \
         RETURNING {RUN_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(source_file)
    .bind(trigger_source)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Marks a run as `running` and sets `started_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::InvalidImportRunTransition`] if the run is not
/// `queued`, or [`DbError::Sqlx`] if the update fails.
pub async fn start_import_run(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE import_runs \
         SET status = 'running', started_at = NOW() \
         WHERE id = $1 AND status = 'queued'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidImportRunTransition {
            id,
            expected_status: "queued",
        });
    }

    Ok(())
}

/// Marks a run as `succeeded` with its final counters.
///
/// # Errors
///
/// Returns [`DbError::InvalidImportRunTransition`] if the run is not
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn complete_import_run(
    pool: &PgPool,
    id: i64,
    counters: &ImportRunCounters,
) -> Result<(), DbError> {
    finish_import_run(pool, id, "succeeded", None, counters).await
}

/// Marks a run as `failed`, keeping whatever counters were reached.
///
/// # Errors
///
/// Returns [`DbError::InvalidImportRunTransition`] if the run is not
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn fail_import_run(
    pool: &PgPool,
    id: i64,
    error_message: &str,
    counters: &ImportRunCounters,
) -> Result<(), DbError> {
    finish_import_run(pool, id, "failed", Some(error_message), counters).await
}

async fn finish_import_run(
    pool: &PgPool,
    id: i64,
    status: &str,
    error_message: Option<&str>,
    counters: &ImportRunCounters,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE import_runs \
         SET status = $2, completed_at = NOW(), error_message = $3, \
             rows_processed = $4, rows_skipped = $5, unique_cards = $6, \
             metadata_matched = $7, metadata_unmatched = $8, records_inserted = $9, \
             records_updated = $10, records_failed = $11 \
         WHERE id = $1 AND status = 'running'",
    )
    .bind(id)
    .bind(status)
    .bind(error_message)
    .bind(counters.rows_processed)
    .bind(counters.rows_skipped)
    .bind(counters.unique_cards)
    .bind(counters.metadata_matched)
    .bind(counters.metadata_unmatched)
    .bind(counters.records_inserted)
    .bind(counters.records_updated)
    .bind(counters.records_failed)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidImportRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Fetches a single run by its internal `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_import_run(pool: &PgPool, id: i64) -> Result<ImportRunRow, DbError> {
    sqlx::query_as::<_, ImportRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM import_runs WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Returns the most recent `limit` runs, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_import_runs(pool: &PgPool, limit: i64) -> Result<Vec<ImportRunRow>, DbError> {
    let rows = sqlx::query_as::<_, ImportRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM import_runs \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
