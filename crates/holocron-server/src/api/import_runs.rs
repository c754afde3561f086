use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ImportRunsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ImportRunItem {
    import_run_id: Uuid,
    source_file: String,
    trigger_source: String,
    status: String,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    rows_processed: i32,
    rows_skipped: i32,
    unique_cards: i32,
    metadata_matched: i32,
    metadata_unmatched: i32,
    records_inserted: i32,
    records_updated: i32,
    records_failed: i32,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<holocron_db::ImportRunRow> for ImportRunItem {
    fn from(row: holocron_db::ImportRunRow) -> Self {
        Self {
            import_run_id: row.public_id,
            source_file: row.source_file,
            trigger_source: row.trigger_source,
            status: row.status,
            started_at: row.started_at,
            completed_at: row.completed_at,
            rows_processed: row.rows_processed,
            rows_skipped: row.rows_skipped,
            unique_cards: row.unique_cards,
            metadata_matched: row.metadata_matched,
            metadata_unmatched: row.metadata_unmatched,
            records_inserted: row.records_inserted,
            records_updated: row.records_updated,
            records_failed: row.records_failed,
            error_message: row.error_message,
            created_at: row.created_at,
        }
    }
}

pub(super) async fn list_import_runs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ImportRunsQuery>,
) -> Result<Json<ApiResponse<Vec<ImportRunItem>>>, ApiError> {
    let rows = holocron_db::list_import_runs(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), state.env, &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(ImportRunItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}
