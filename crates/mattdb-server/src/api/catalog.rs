//! Catalog read endpoints: categories and per-category product cards.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct CategoryItem {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Serialize)]
pub(super) struct CategoryProductCard {
    pub product_id: i64,
    pub name: String,
    pub headline: Option<String>,
    pub rating: Option<Decimal>,
    pub main_image_url: Option<String>,
    pub variant_count: i64,
    pub lowest_price: Option<Decimal>,
    pub badges: Value,
    /// Free-gift enrichment derived from the stored badge flags.
    pub has_free_gift: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct CategoryProductsQuery {
    pub limit: Option<i64>,
}

/// GET /api/v1/categories — active categories in display order.
pub(super) async fn list_categories(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<CategoryItem>>>, ApiError> {
    let rows = mattdb_db::list_active_categories(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| CategoryItem {
            id: row.id,
            name: row.name,
            slug: row.slug,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// GET /api/v1/categories/{slug}/products — product cards for a category.
pub(super) async fn list_category_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(slug): Path<String>,
    Query(query): Query<CategoryProductsQuery>,
) -> Result<Json<ApiResponse<Vec<CategoryProductCard>>>, ApiError> {
    let rid = &req_id.0;

    let category = mattdb_db::get_category_by_slug(&state.pool, &slug)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(rid, "not_found", format!("no category with slug '{slug}'"))
        })?;

    let rows = mattdb_db::list_category_products(
        &state.pool,
        category.id,
        Some(normalize_limit(query.limit)),
    )
    .await
    .map_err(|e| map_db_error(rid.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| CategoryProductCard {
            product_id: row.product_id,
            name: row.product_name,
            headline: row.headline,
            rating: row.rating,
            main_image_url: row.main_image_url,
            variant_count: row.variant_count,
            lowest_price: row.lowest_price,
            has_free_gift: badge_enabled(&row.badges, "free_gift"),
            badges: row.badges,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Checks whether the stored badge array enables the given badge type.
/// Tolerates malformed or legacy badge payloads by reporting `false`.
pub(super) fn badge_enabled(badges: &Value, badge_type: &str) -> bool {
    badges.as_array().is_some_and(|entries| {
        entries
            .iter()
            .any(|entry| entry["type"] == badge_type && entry["enabled"] == true)
    })
}
