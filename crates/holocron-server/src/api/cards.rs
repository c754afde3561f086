use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use holocron_core::{
    normalize_set_code, CardKey, CardType, CollectionStatistics, Rarity, VariantPatch,
    VariantQuantities,
};
use holocron_db::{CardListFilters, CardRow};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::middleware::RequestId;

use super::{
    map_db_error, normalize_limit, normalize_page, ApiError, ApiResponse, AppState, ResponseMeta,
};

#[derive(Debug, Deserialize)]
pub(super) struct CardsQuery {
    pub set: Option<String>,
    #[serde(rename = "type")]
    pub card_type: Option<String>,
    pub rarity: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CardItem {
    id: String,
    set_code: String,
    card_number: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    subtitle: Option<String>,
    rarity: Option<String>,
    #[serde(rename = "type")]
    card_type: Option<String>,
    aspects: Vec<String>,
    cost: Option<i32>,
    power: Option<i32>,
    hp: Option<i32>,
    variants: VariantQuantities,
    total_quantity: i32,
    metadata_source: String,
    updated_at: DateTime<Utc>,
}

impl From<CardRow> for CardItem {
    fn from(row: CardRow) -> Self {
        let variants = row.variants();
        Self {
            id: row.card_key,
            set_code: row.set_code,
            card_number: row.card_number,
            name: row.name,
            subtitle: row.subtitle,
            rarity: row.rarity,
            card_type: row.card_type,
            aspects: row.aspects,
            cost: row.cost,
            power: row.power,
            hp: row.hp,
            variants,
            total_quantity: row.total_quantity,
            metadata_source: row.metadata_source,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(super) struct Pagination {
    current_page: i64,
    total_pages: i64,
    total_items: i64,
    items_per_page: i64,
    has_next: bool,
    has_prev: bool,
}

impl Pagination {
    fn new(page: i64, limit: i64, total_items: i64) -> Self {
        let total_pages = if total_items == 0 {
            0
        } else {
            (total_items + limit - 1) / limit
        };
        Self {
            current_page: page,
            total_pages,
            total_items,
            items_per_page: limit,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct CardList {
    cards: Vec<CardItem>,
    pagination: Pagination,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub(super) async fn list_cards(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CardsQuery>,
) -> Result<Json<ApiResponse<CardList>>, ApiError> {
    let set_code = match non_empty(query.set.as_deref()) {
        Some(raw) => {
            let code = normalize_set_code(raw);
            if code.is_empty() {
                return Err(ApiError::new(
                    req_id.0,
                    "validation_error",
                    format!("set \"{raw}\" does not contain a set code"),
                ));
            }
            Some(code)
        }
        None => None,
    };
    // Filters accept either the source English term or the catalog term.
    let card_type = non_empty(query.card_type.as_deref())
        .map(|t| CardType::translate(t).as_catalog_str().to_string());
    let rarity = non_empty(query.rarity.as_deref())
        .map(|r| Rarity::translate(r).as_catalog_str().to_string());

    let page = normalize_page(query.page);
    let limit = normalize_limit(query.limit);
    let filters = CardListFilters {
        set_code: set_code.as_deref(),
        card_type: card_type.as_deref(),
        rarity: rarity.as_deref(),
        search: non_empty(query.search.as_deref()),
        page,
        limit,
    };

    let result = holocron_db::list_cards(&state.pool, &filters)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), state.env, &e))?;

    Ok(Json(ApiResponse {
        data: CardList {
            cards: result.rows.into_iter().map(CardItem::from).collect(),
            pagination: Pagination::new(page, limit, result.total_items),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn resolve_path_key(req_id: &RequestId, set_code: &str, card_number: &str) -> Result<CardKey, ApiError> {
    CardKey::resolve(set_code, card_number)
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))
}

pub(super) async fn get_card(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((set_code, card_number)): Path<(String, String)>,
) -> Result<Json<ApiResponse<CardItem>>, ApiError> {
    let key = resolve_path_key(&req_id, &set_code, &card_number)?;
    let row = holocron_db::get_card(&state.pool, &key)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), state.env, &e))?;

    Ok(Json(ApiResponse {
        data: CardItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Partial update of variant quantities, e.g. `{"normal": 3, "foil": 1}`.
pub(super) async fn update_card(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((set_code, card_number)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<CardItem>>, ApiError> {
    let key = resolve_path_key(&req_id, &set_code, &card_number)?;
    let Json(body) = body.map_err(|rejection| {
        ApiError::new(req_id.0.clone(), "bad_request", rejection.body_text())
    })?;
    let patch = VariantPatch::from_json(&body)
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    let row = holocron_db::update_card_variants(&state.pool, &key, &patch)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), state.env, &e))?;
    tracing::info!(card_key = %key, total = row.total_quantity, "card quantities updated");

    Ok(Json(ApiResponse {
        data: CardItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn card_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<CollectionStatistics>>, ApiError> {
    let stats = holocron_db::collection_statistics(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), state.env, &e))?;

    Ok(Json(ApiResponse {
        data: stats,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
#[path = "cards_test.rs"]
mod tests;
