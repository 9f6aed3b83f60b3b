//! Read-model queries used by `mattdb-server` catalog endpoints.

use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::PgPool;

use crate::DbError;

/// Product card row tailored for category listing views: one row per
/// product with its resolved main image, variant summary, and badge flags.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryProductCardRow {
    pub product_id: i64,
    pub product_name: String,
    pub headline: Option<String>,
    pub rating: Option<Decimal>,
    pub main_image_url: Option<String>,
    pub variant_count: i64,
    /// Lowest current price across available variants.
    pub lowest_price: Option<Decimal>,
    pub badges: Value,
}

/// Returns product cards for a category, newest first.
///
/// The main image is resolved per product by preferring the row flagged
/// `is_main_image`, then the lowest `sort_order`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_category_products(
    pool: &PgPool,
    category_id: i64,
    limit: Option<i64>,
) -> Result<Vec<CategoryProductCardRow>, DbError> {
    let rows = sqlx::query_as::<_, CategoryProductCardRow>(
        "SELECT \
             p.id AS product_id, \
             p.name AS product_name, \
             p.headline, \
             p.rating, \
             (SELECT pi.image_url FROM product_images pi \
              WHERE pi.product_id = p.id \
              ORDER BY pi.is_main_image DESC, pi.sort_order ASC, pi.id ASC \
              LIMIT 1) AS main_image_url, \
             (SELECT COUNT(*) FROM product_variants pv \
              WHERE pv.product_id = p.id) AS variant_count, \
             (SELECT MIN(pv.current_price) FROM product_variants pv \
              WHERE pv.product_id = p.id AND pv.availability) AS lowest_price, \
             p.badges \
         FROM products p \
         WHERE p.category_id = $1 \
         ORDER BY p.created_at DESC, p.id DESC \
         LIMIT COALESCE($2, 9223372036854775807)",
    )
    .bind(category_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
