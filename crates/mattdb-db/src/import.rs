//! Sequential bulk-import orchestration.
//!
//! Rows are processed one at a time, each fully completing before the next
//! begins. There is no transaction spanning a product and its child groups;
//! partial success across groups is possible and expected. Failures follow
//! a continue-on-recoverable policy: a bad row or child group is logged and
//! skipped, and only the aggregate inserted count surfaces to callers.

use mattdb_core::{decode_row, ImportRow, ProductImport};
use sqlx::PgPool;

use crate::{categories, products};

/// Aggregate result of a bulk import.
///
/// `inserted` counts rows whose product insert succeeded on either schema
/// tier. Child-group failures never reduce the count, and skipped rows are
/// indistinguishable from rows that were never submitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    pub inserted: usize,
}

/// Runs a bulk import over the given rows, strictly in order.
pub async fn run_import(pool: &PgPool, rows: &[ImportRow]) -> ImportOutcome {
    let mut inserted = 0usize;

    for (index, row) in rows.iter().enumerate() {
        let Some(import) = decode_row(row) else {
            tracing::warn!(row = index, "skipping row with blank name");
            continue;
        };

        let category =
            match categories::get_category_by_slug(pool, &import.product.category_slug).await {
                Ok(Some(category)) => category,
                Ok(None) => {
                    tracing::warn!(
                        row = index,
                        slug = %import.product.category_slug,
                        "skipping row: category not found"
                    );
                    continue;
                }
                Err(e) => {
                    tracing::warn!(row = index, error = %e, "skipping row: category lookup failed");
                    continue;
                }
            };

        let product_id = match products::insert_product(pool, category.id, &import.product).await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(
                    row = index,
                    product = %import.product.name,
                    error = %e,
                    "skipping row: product insert failed on both shapes"
                );
                continue;
            }
        };

        inserted += 1;
        persist_children(pool, product_id, &import).await;
    }

    ImportOutcome { inserted }
}

/// Persists every child group for a freshly inserted product, in a fixed
/// sequence. Each group is independent: a failing group is logged and the
/// remaining groups still run.
async fn persist_children(pool: &PgPool, product_id: i64, import: &ProductImport) {
    if let Err(e) = products::insert_images(pool, product_id, &import.images).await {
        tracing::warn!(product_id, error = %e, "image insert failed");
    }
    if let Err(e) = products::insert_custom_reasons(pool, product_id, &import.reasons_to_buy).await
    {
        tracing::warn!(product_id, error = %e, "reasons-to-buy insert failed");
    }
    if let Err(e) = products::insert_features(pool, product_id, &import.features).await {
        tracing::warn!(product_id, error = %e, "feature insert failed");
    }
    if let Err(e) =
        products::insert_reasons_to_love(pool, product_id, &import.reasons_to_love).await
    {
        tracing::warn!(product_id, error = %e, "reasons-to-love insert failed");
    }
    if let Err(e) = products::insert_variants(pool, product_id, &import.variants).await {
        tracing::warn!(product_id, error = %e, "variant insert failed");
    }
    if let Err(e) = products::insert_descriptions(pool, product_id, &import.descriptions).await {
        tracing::warn!(product_id, error = %e, "description insert failed");
    }
    if let Err(e) = products::insert_faqs(pool, product_id, &import.faqs).await {
        tracing::warn!(product_id, error = %e, "faq insert failed");
    }
    if let Err(e) =
        products::insert_warranty_sections(pool, product_id, &import.warranty_sections).await
    {
        tracing::warn!(product_id, error = %e, "warranty section insert failed");
    }
    if let Err(e) = products::insert_notices(pool, product_id, &import.notices).await {
        tracing::warn!(product_id, error = %e, "notice insert failed");
    }
    // Badges are rewritten unconditionally, even when the row carried none.
    if let Err(e) = products::update_product_badges(pool, product_id, import.badges).await {
        tracing::warn!(product_id, error = %e, "badges update failed");
    }
    if let Some(dimensions) = &import.dimensions {
        if let Err(e) = products::insert_dimensions(pool, product_id, dimensions).await {
            tracing::warn!(product_id, error = %e, "dimensions insert failed");
        }
    }
    if let Err(e) =
        products::insert_popular_categories(pool, product_id, &import.popular_categories).await
    {
        tracing::warn!(product_id, error = %e, "popular categories insert failed");
    }
}
