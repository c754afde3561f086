mod cards;
mod import_runs;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use holocron_core::Environment;
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// Controls whether internal error detail is exposed to clients.
    pub env: Environment,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
                detail: None,
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.error.detail = Some(detail.into());
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) const DEFAULT_PAGE_LIMIT: i64 = 20;
pub(super) const MAX_PAGE_LIMIT: i64 = 100;

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT)
}

pub(super) fn normalize_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}

pub(super) fn map_db_error(
    request_id: String,
    env: Environment,
    error: &holocron_db::DbError,
) -> ApiError {
    match error {
        holocron_db::DbError::NotFound => ApiError::new(request_id, "not_found", "card not found"),
        holocron_db::DbError::Validation(message) => {
            ApiError::new(request_id, "validation_error", message.clone())
        }
        other => {
            tracing::error!(error = %other, "database query failed");
            let api_error = ApiError::new(request_id, "internal_error", "database query failed");
            if env.is_production() {
                api_error
            } else {
                api_error.with_detail(other.to_string())
            }
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::PUT])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/cards", get(cards::list_cards))
        .route("/api/v1/cards/stats", get(cards::card_stats))
        .route(
            "/api/v1/cards/{set_code}/{card_number}",
            get(cards::get_card).put(cards::update_card),
        )
        .route("/api/v1/import-runs", get(import_runs::list_import_runs))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match holocron_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    #[test]
    fn normalize_limit_applies_defaults_and_bounds() {
        assert_eq!(normalize_limit(None), 20);
        assert_eq!(normalize_limit(Some(0)), 1);
        assert_eq!(normalize_limit(Some(1_000)), 100);
        assert_eq!(normalize_limit(Some(25)), 25);
    }

    #[test]
    fn normalize_page_is_one_based() {
        assert_eq!(normalize_page(None), 1);
        assert_eq!(normalize_page(Some(-3)), 1);
        assert_eq!(normalize_page(Some(4)), 4);
    }

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_errors_hide_detail_in_production() {
        let err = holocron_db::DbError::Sqlx(sqlx::Error::PoolTimedOut);
        let prod = map_db_error("r".into(), Environment::Production, &err);
        assert_eq!(prod.error.code, "internal_error");
        assert!(prod.error.detail.is_none());

        let dev = map_db_error("r".into(), Environment::Development, &err);
        assert!(dev.error.detail.is_some());
    }

    #[test]
    fn not_found_and_validation_map_to_client_errors() {
        let nf = map_db_error("r".into(), Environment::Production, &holocron_db::DbError::NotFound);
        assert_eq!(nf.into_response().status(), StatusCode::NOT_FOUND);
        let v = map_db_error(
            "r".into(),
            Environment::Production,
            &holocron_db::DbError::Validation("cards_rarity_check".into()),
        );
        assert_eq!(v.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn response_meta_uses_camel_case() {
        let json = serde_json::to_value(ResponseMeta::new("abc".into())).unwrap();
        assert_eq!(json["requestId"], "abc");
        assert!(json["timestamp"].is_string());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn health_reports_ok(pool: sqlx::PgPool) {
        let app = build_app(AppState {
            pool,
            env: Environment::Test,
        });
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        assert_eq!(json["data"]["database"], "ok");
        assert!(json["meta"]["requestId"].is_string());
    }
}
