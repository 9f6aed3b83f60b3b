//! Database operations for `categories`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `categories` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Looks up a category by its exact slug.
///
/// Returns `None` when no category matches; the importer treats that as a
/// row-skip condition rather than an error.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_category_by_slug(pool: &PgPool, slug: &str) -> Result<Option<CategoryRow>, DbError> {
    let row = sqlx::query_as::<_, CategoryRow>(
        "SELECT id, name, slug, is_active, created_at, updated_at \
         FROM categories \
         WHERE slug = $1",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Lists active categories in display order (by name).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_categories(pool: &PgPool) -> Result<Vec<CategoryRow>, DbError> {
    Ok(sqlx::query_as::<_, CategoryRow>(
        "SELECT id, name, slug, is_active, created_at, updated_at \
         FROM categories \
         WHERE is_active = TRUE \
         ORDER BY name ASC",
    )
    .fetch_all(pool)
    .await?)
}

/// Upserts a category by slug, updating the display name in place.
///
/// Returns the internal `id` of the upserted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_category(pool: &PgPool, name: &str, slug: &str) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO categories (name, slug, is_active) \
         VALUES ($1, $2, TRUE) \
         ON CONFLICT (slug) DO UPDATE SET \
             name       = EXCLUDED.name, \
             updated_at = NOW() \
         RETURNING id",
    )
    .bind(name)
    .bind(slug)
    .fetch_one(pool)
    .await?;

    Ok(id)
}
