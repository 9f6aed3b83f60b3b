//! Category seeding. The importer resolves categories by slug and skips
//! rows whose category does not exist, so a fresh database must be seeded
//! before the first import.

use sqlx::PgPool;

use crate::DbError;

/// The storefront's category set, `(name, slug)`.
const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Mattresses", "mattresses"),
    ("Beds", "beds"),
    ("Sofas", "sofas"),
    ("Sofa Beds", "sofa-beds"),
    ("Pillows", "pillows"),
    ("Toppers", "toppers"),
    ("Bedding", "bedding"),
    ("Furniture", "furniture"),
];

/// Upsert the default categories into the database.
///
/// Returns the number of categories processed (inserted or updated).
/// All upserts run inside a single transaction; if any operation fails
/// the entire batch is rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_categories(pool: &PgPool) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for (name, slug) in DEFAULT_CATEGORIES {
        sqlx::query(
            "INSERT INTO categories (name, slug, is_active) \
             VALUES ($1, $2, TRUE) \
             ON CONFLICT (slug) DO UPDATE SET \
                 name       = EXCLUDED.name, \
                 updated_at = NOW()",
        )
        .bind(name)
        .bind(slug)
        .execute(&mut *tx)
        .await?;

        count += 1;
    }

    tx.commit().await?;
    Ok(count)
}
