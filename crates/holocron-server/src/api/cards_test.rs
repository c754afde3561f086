use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use holocron_core::{
    CardKey, CatalogRecord, EnrichedCardMetadata, Environment, MetadataSource, Rarity,
    Translation, VariantName, VariantQuantities,
};
use holocron_db::{write_catalog, PgCardStore};
use tower::ServiceExt;

use super::Pagination;
use crate::api::{build_app, AppState};

// -------------------------------------------------------------------------
// Pure helpers
// -------------------------------------------------------------------------

#[test]
fn pagination_math() {
    let p = Pagination::new(2, 20, 45);
    assert_eq!(p.total_pages, 3);
    assert!(p.has_next);
    assert!(p.has_prev);

    let last = Pagination::new(3, 20, 45);
    assert!(!last.has_next);

    let empty = Pagination::new(1, 20, 0);
    assert_eq!(empty.total_pages, 0);
    assert!(!empty.has_next);
    assert!(!empty.has_prev);
}

#[test]
fn pagination_serializes_camel_case() {
    let json = serde_json::to_value(Pagination::new(1, 10, 5)).unwrap();
    assert_eq!(json["currentPage"], 1);
    assert_eq!(json["itemsPerPage"], 10);
    assert_eq!(json["hasPrev"], false);
}

// -------------------------------------------------------------------------
// Route integration tests (with DB)
// -------------------------------------------------------------------------

fn card(set: &str, number: &str, name: &str, rarity: Option<Rarity>, normal: u32) -> CatalogRecord {
    CatalogRecord {
        key: CardKey::resolve(set, number).unwrap(),
        name: name.to_string(),
        variants: VariantQuantities::default().with(VariantName::Normal, normal),
        metadata: EnrichedCardMetadata {
            rarity: rarity.map(Translation::Known),
            ..EnrichedCardMetadata::default()
        },
        metadata_source: MetadataSource::External,
    }
}

async fn seeded_app(pool: sqlx::PgPool) -> Router {
    let store = PgCardStore::new(pool.clone());
    let mut vader = card("sor", "10", "Darth Vader", Some(Rarity::Legendary), 0);
    vader.metadata.subtitle = Some("Dark Lord of the Sith".to_string());
    let records = vec![
        card("sor", "1", "Director Krennic", Some(Rarity::Common), 2),
        card("sor", "5", "Luke Skywalker", Some(Rarity::Rare), 1),
        vader,
        card("shd", "45", "Cad Bane", None, 1),
    ];
    let report = write_catalog(&store, &records, 10).await;
    assert!(report.failed.is_empty(), "seed failed: {:?}", report.failed);

    build_app(AppState {
        pool,
        env: Environment::Test,
    })
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

fn put_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_cards_filters_by_raw_set_label(pool: sqlx::PgPool) {
    let app = seeded_app(pool).await;
    let (status, json) = send(app, get("/api/v1/cards?set=1SOR&limit=2")).await;

    assert_eq!(status, StatusCode::OK);
    let cards = json["data"]["cards"].as_array().expect("cards array");
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0]["id"], "sor-001");
    assert_eq!(cards[0]["variants"]["normal"], 2);
    assert_eq!(cards[0]["variants"]["serialized_prestige"], 0);
    assert_eq!(json["data"]["pagination"]["totalItems"], 3);
    assert_eq!(json["data"]["pagination"]["totalPages"], 2);
    assert_eq!(json["data"]["pagination"]["hasNext"], true);
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_cards_accepts_english_rarity_and_search(pool: sqlx::PgPool) {
    let app = seeded_app(pool).await;
    let (_, json) = send(app.clone(), get("/api/v1/cards?rarity=Legendary")).await;
    assert_eq!(json["data"]["pagination"]["totalItems"], 1);
    assert_eq!(json["data"]["cards"][0]["rarity"], "legendaria");

    let (_, json) = send(app, get("/api/v1/cards?search=SKY")).await;
    assert_eq!(json["data"]["cards"][0]["name"], "Luke Skywalker");
}

#[sqlx::test(migrations = "../../migrations")]
async fn search_matches_subtitle_and_returns_it(pool: sqlx::PgPool) {
    let app = seeded_app(pool).await;
    let (status, json) = send(app, get("/api/v1/cards?search=dark%20lord")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["pagination"]["totalItems"], 1);
    let vader = &json["data"]["cards"][0];
    assert_eq!(vader["name"], "Darth Vader");
    assert_eq!(vader["subtitle"], "Dark Lord of the Sith");
}

#[sqlx::test(migrations = "../../migrations")]
async fn get_card_resolves_unpadded_number(pool: sqlx::PgPool) {
    let app = seeded_app(pool).await;
    let (status, json) = send(app.clone(), get("/api/v1/cards/SOR/5")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["id"], "sor-005");
    assert_eq!(json["data"]["totalQuantity"], 1);

    let (status, json) = send(app, get("/api/v1/cards/sor/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");
}

#[sqlx::test(migrations = "../../migrations")]
async fn put_merges_variants_and_recomputes_total(pool: sqlx::PgPool) {
    let app = seeded_app(pool).await;
    let (status, json) = send(
        app,
        put_json("/api/v1/cards/sor/005", r#"{"normal": 3, "foil": 1}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["variants"]["normal"], 3);
    assert_eq!(json["data"]["variants"]["foil"], 1);
    assert_eq!(json["data"]["totalQuantity"], 4);
}

#[sqlx::test(migrations = "../../migrations")]
async fn put_rejects_bad_fields_naming_them(pool: sqlx::PgPool) {
    let app = seeded_app(pool).await;

    let (status, json) = send(
        app.clone(),
        put_json("/api/v1/cards/sor/1", r#"{"shiny": 1}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]["message"].as_str().unwrap().contains("shiny"));

    let (status, json) = send(
        app.clone(),
        put_json("/api/v1/cards/sor/1", r#"{"foil": -2}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]["message"].as_str().unwrap().contains("foil"));

    let (status, _) = send(app.clone(), put_json("/api/v1/cards/sor/1", r#"{"normal": 1.5}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(app.clone(), put_json("/api/v1/cards/sor/1", "{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(app, put_json("/api/v1/cards/sor/1", "not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../migrations")]
async fn put_unknown_card_is_not_found(pool: sqlx::PgPool) {
    let app = seeded_app(pool).await;
    let (status, _) = send(app, put_json("/api/v1/cards/twi/7", r#"{"normal": 1}"#)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../migrations")]
async fn stats_groups_by_set_and_rarity(pool: sqlx::PgPool) {
    let app = seeded_app(pool).await;
    let (status, json) = send(app, get("/api/v1/cards/stats")).await;

    assert_eq!(status, StatusCode::OK);
    let data = &json["data"];
    assert_eq!(data["overview"]["totalCards"], 4);
    assert_eq!(data["overview"]["ownedCards"], 3);
    assert_eq!(data["overview"]["totalPhysicalCards"], 4);
    assert_eq!(data["overview"]["completionPercentage"], "75.0");

    let by_set = data["bySet"].as_array().expect("bySet");
    let sor = by_set.iter().find(|g| g["setCode"] == "sor").expect("sor group");
    assert_eq!(sor["totalCards"], 3);
    assert_eq!(sor["ownedCards"], 2);

    let by_rarity = data["byRarity"].as_array().expect("byRarity");
    assert!(by_rarity.iter().any(|g| g["rarity"] == "unknown"));
}
