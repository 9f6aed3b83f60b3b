mod catalog;
mod imports;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
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
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

pub(super) fn map_db_error(request_id: String, error: &mattdb_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

fn admin_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/admin/products/bulk", post(imports::bulk_import))
        .layer(ServiceBuilder::new().layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        )))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/categories", get(catalog::list_categories))
        .route(
            "/api/v1/categories/{slug}/products",
            get(catalog::list_category_products),
        );

    Router::new()
        .merge(public_routes)
        .merge(admin_router(rate_limit))
        .layer(
            ServiceBuilder::new()
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

    match mattdb_db::health_check(&state.pool).await {
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
    use super::catalog::{badge_enabled, CategoryProductCard};
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::time::Duration;
    use tower::ServiceExt;

    // -------------------------------------------------------------------------
    // Serialization and helper unit tests (no DB)
    // -------------------------------------------------------------------------

    #[test]
    fn category_product_card_is_serializable() {
        let card = CategoryProductCard {
            product_id: 7,
            name: "Cloud Nine Hybrid".to_string(),
            headline: Some("Award-winning comfort".to_string()),
            rating: Some(Decimal::new(450, 2)),
            main_image_url: Some("/main.jpg".to_string()),
            variant_count: 3,
            lowest_price: Some(Decimal::new(19900, 2)),
            badges: json!([{ "type": "sale", "enabled": true }]),
            has_free_gift: false,
        };
        let json = serde_json::to_string(&card).expect("serialize CategoryProductCard");
        assert!(json.contains("\"name\":\"Cloud Nine Hybrid\""));
        assert!(json.contains("\"variant_count\":3"));
        assert!(json.contains("\"has_free_gift\":false"));
    }

    #[test]
    fn badge_enabled_reads_the_stored_array() {
        let badges = json!([
            { "type": "sale", "enabled": false },
            { "type": "new_in", "enabled": false },
            { "type": "free_gift", "enabled": true },
        ]);
        assert!(badge_enabled(&badges, "free_gift"));
        assert!(!badge_enabled(&badges, "sale"));
        assert!(!badge_enabled(&badges, "unknown"));
    }

    #[test]
    fn badge_enabled_tolerates_malformed_payloads() {
        assert!(!badge_enabled(&json!({}), "sale"));
        assert!(!badge_enabled(&json!("sale"), "sale"));
        assert!(!badge_enabled(&json!([{ "type": "sale" }]), "sale"));
    }

    #[test]
    fn normalize_limit_applies_defaults_and_bounds() {
        assert_eq!(normalize_limit(None), 50);
        assert_eq!(normalize_limit(Some(0)), 1);
        assert_eq!(normalize_limit(Some(1_000)), 200);
        assert_eq!(normalize_limit(Some(25)), 25);
    }

    #[test]
    fn api_error_not_found_maps_to_404() {
        let response = ApiError::new("req-1", "not_found", "no such category").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    // -------------------------------------------------------------------------
    // Route integration tests (with DB)
    // -------------------------------------------------------------------------

    fn test_rate_limit_state() -> RateLimitState {
        RateLimitState::new(120, Duration::from_secs(60))
    }

    fn post_bulk(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/admin/products/bulk")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .expect("request")
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&bytes).expect("json parse")
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn bulk_import_returns_inserted_count(pool: sqlx::PgPool) {
        mattdb_db::seed_categories(&pool).await.expect("seed");

        let app = build_app(AppState { pool: pool.clone() }, test_rate_limit_state());
        let body = json!({
            "rows": [
                { "name": "Cloud Nine Hybrid", "variants": "sku=SKU1;current=299" },
                { "name": "   " },
            ]
        });
        let response = app
            .oneshot(post_bulk(&body.to_string()))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json, json!({ "inserted": 1 }));

        let products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&pool)
            .await
            .expect("count products");
        assert_eq!(products, 1);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn bulk_import_empty_rows_is_bad_request(pool: sqlx::PgPool) {
        let app = build_app(AppState { pool }, test_rate_limit_state());
        let response = app
            .oneshot(post_bulk(r#"{"rows": []}"#))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json, json!({ "error": "No rows provided" }));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn bulk_import_missing_rows_field_is_bad_request(pool: sqlx::PgPool) {
        let app = build_app(AppState { pool }, test_rate_limit_state());
        let response = app.oneshot(post_bulk(r"{}")).await.expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json, json!({ "error": "No rows provided" }));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn bulk_import_undecodable_body_is_internal_error(pool: sqlx::PgPool) {
        let app = build_app(AppState { pool }, test_rate_limit_state());
        let response = app
            .oneshot(post_bulk("this is not json"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert!(json["error"].is_string(), "expected error message: {json}");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn bulk_import_is_rate_limited(pool: sqlx::PgPool) {
        let rate_limit = RateLimitState::new(1, Duration::from_secs(60));
        let app = build_app(AppState { pool }, rate_limit);

        let first = app
            .clone()
            .oneshot(post_bulk(r#"{"rows": []}"#))
            .await
            .expect("first response");
        assert_eq!(first.status(), StatusCode::BAD_REQUEST);

        let second = app
            .oneshot(post_bulk(r#"{"rows": []}"#))
            .await
            .expect("second response");
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn category_products_returns_cards_with_free_gift_flag(pool: sqlx::PgPool) {
        mattdb_db::seed_categories(&pool).await.expect("seed");

        let import_rows: Vec<mattdb_core::ImportRow> = serde_json::from_value(json!([{
            "name": "Gift Bundle Mattress",
            "category": "mattresses",
            "images": "/bundle.jpg",
            "variants": "size=Double;current=499",
            "badges": "free_gift"
        }]))
        .expect("rows");
        assert_eq!(mattdb_db::run_import(&pool, &import_rows).await.inserted, 1);

        let app = build_app(AppState { pool }, test_rate_limit_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/categories/mattresses/products")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let data = json["data"].as_array().expect("data array");
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["name"], "Gift Bundle Mattress");
        assert_eq!(data[0]["main_image_url"], "/bundle.jpg");
        assert_eq!(data[0]["has_free_gift"], true);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn category_products_returns_404_for_unknown_slug(pool: sqlx::PgPool) {
        let app = build_app(AppState { pool }, test_rate_limit_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/categories/no-such-category/products")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn list_categories_returns_seeded_set(pool: sqlx::PgPool) {
        mattdb_db::seed_categories(&pool).await.expect("seed");

        let app = build_app(AppState { pool }, test_rate_limit_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/categories")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let data = json["data"].as_array().expect("data array");
        assert!(
            data.iter().any(|c| c["slug"] == "mattresses"),
            "mattresses category missing: {json}"
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn health_reports_ok_with_live_database(pool: sqlx::PgPool) {
        let app = build_app(AppState { pool }, test_rate_limit_state());
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
        let json = body_json(response).await;
        assert_eq!(json["data"]["status"], "ok");
    }
}
