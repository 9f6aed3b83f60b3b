//! Database operations for `products` and the per-product child tables
//! populated by the bulk importer.
//!
//! Inserts that touch columns added by the extended-import migration follow
//! a two-tier policy: attempt the wide shape first, and on failure retry the
//! narrow shape so imports keep working against databases that have not run
//! that migration. The retry is a correctness fallback for schema drift, not
//! a resiliency mechanism.

use chrono::{DateTime, Utc};
use mattdb_core::{
    BadgeSet, DescriptionParagraph, DimensionsImport, Faq, ImageImport, NewProduct, ReasonToLove,
    TitledSection, VariantImport,
};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `product_images` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductImageRow {
    pub id: i64,
    pub product_id: i64,
    pub image_url: String,
    pub is_main_image: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

/// A row from the `product_variants` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VariantRow {
    pub id: i64,
    pub product_id: i64,
    pub sku: Option<String>,
    pub sdi_number: Option<String>,
    pub original_price: Decimal,
    pub current_price: Decimal,
    pub color: Option<String>,
    pub depth: Option<String>,
    pub firmness: Option<String>,
    pub size: Option<String>,
    pub length: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub availability: bool,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// products operations
// ---------------------------------------------------------------------------

/// Inserts a product row, probing the extended column set first.
///
/// The wide insert carries the extended attributes (care instructions,
/// trial information, comfort levels). On any failure it is retried with
/// only the base columns; if the base insert also fails the error is
/// returned and the caller abandons the row.
///
/// Returns the generated product `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if both insert shapes fail.
pub async fn insert_product(
    pool: &PgPool,
    category_id: i64,
    product: &NewProduct,
) -> Result<i64, DbError> {
    match insert_product_extended(pool, category_id, product).await {
        Ok(id) => Ok(id),
        Err(e) => {
            tracing::warn!(
                product = %product.name,
                error = %e,
                "extended product insert failed; retrying base shape"
            );
            insert_product_base(pool, category_id, product).await
        }
    }
}

async fn insert_product_extended(
    pool: &PgPool,
    category_id: i64,
    product: &NewProduct,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO products \
             (category_id, name, rating, headline, long_description, \
              care_instructions, trial_information, warranty_delivery_line, \
              firmness_scale, support_level, pressure_relief_level, \
              air_circulation_level, durability_level) \
         VALUES ($1, $2, $3::numeric(3,2), $4, $5, \
                 $6, $7, $8, \
                 $9, $10, $11, \
                 $12, $13) \
         RETURNING id",
    )
    .bind(category_id)
    .bind(&product.name)
    .bind(product.rating)
    .bind(&product.headline)
    .bind(&product.long_description)
    .bind(&product.care_instructions)
    .bind(&product.trial_information)
    .bind(&product.warranty_delivery_line)
    .bind(&product.firmness_scale)
    .bind(&product.support_level)
    .bind(&product.pressure_relief_level)
    .bind(&product.air_circulation_level)
    .bind(&product.durability_level)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

async fn insert_product_base(
    pool: &PgPool,
    category_id: i64,
    product: &NewProduct,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO products (category_id, name, rating, headline, long_description) \
         VALUES ($1, $2, $3::numeric(3,2), $4, $5) \
         RETURNING id",
    )
    .bind(category_id)
    .bind(&product.name)
    .bind(product.rating)
    .bind(&product.headline)
    .bind(&product.long_description)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Rewrites the product's `badges` JSONB field with the full fixed
/// three-entry array, even when every flag is disabled.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails (e.g. against a schema
/// without the `badges` column).
pub async fn update_product_badges(
    pool: &PgPool,
    product_id: i64,
    badges: BadgeSet,
) -> Result<(), DbError> {
    sqlx::query("UPDATE products SET badges = $2::jsonb, updated_at = NOW() WHERE id = $1")
        .bind(product_id)
        .bind(badges.to_json())
        .execute(pool)
        .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Child tables without a legacy fallback shape
// ---------------------------------------------------------------------------

/// Inserts the image rows for a product. `sort_order` is the source
/// position; the main-image flag is decided at decode time.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on the first failing insert.
pub async fn insert_images(
    pool: &PgPool,
    product_id: i64,
    images: &[ImageImport],
) -> Result<(), DbError> {
    for (idx, image) in images.iter().enumerate() {
        sqlx::query(
            "INSERT INTO product_images (product_id, image_url, is_main_image, sort_order) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(product_id)
        .bind(&image.image_url)
        .bind(image.is_main_image)
        .bind(sort_order(idx))
        .execute(pool)
        .await?;
    }
    Ok(())
}

/// Inserts feature rows. No dedup is attempted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on the first failing insert.
pub async fn insert_features(
    pool: &PgPool,
    product_id: i64,
    features: &[String],
) -> Result<(), DbError> {
    for feature in features {
        sqlx::query("INSERT INTO product_features (product_id, feature_name) VALUES ($1, $2)")
            .bind(product_id)
            .bind(feature)
            .execute(pool)
            .await?;
    }
    Ok(())
}

/// Inserts variant rows and attaches variant images where present.
///
/// Prices are bound as `f64` and cast to `NUMERIC(10,2)` by the database
/// engine. The image attach is a best-effort second step: it re-queries the
/// most recently created variant for the product and updates it, and its
/// failure is logged without aborting the remaining variants.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on the first failing variant insert.
pub async fn insert_variants(
    pool: &PgPool,
    product_id: i64,
    variants: &[VariantImport],
) -> Result<(), DbError> {
    for variant in variants {
        sqlx::query(
            "INSERT INTO product_variants \
                 (product_id, sku, sdi_number, original_price, current_price, \
                  color, depth, firmness, size, length, width, height, availability) \
             VALUES ($1, $2, $3, $4::numeric(10,2), $5::numeric(10,2), \
                     $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(product_id)
        .bind(&variant.sku)
        .bind(&variant.sdi_number)
        .bind(variant.original_price)
        .bind(variant.current_price)
        .bind(&variant.color)
        .bind(&variant.depth)
        .bind(&variant.firmness)
        .bind(&variant.size)
        .bind(&variant.length)
        .bind(&variant.width)
        .bind(&variant.height)
        .bind(variant.availability)
        .execute(pool)
        .await?;

        if let Some(image_url) = &variant.image_url {
            if let Err(e) = attach_latest_variant_image(pool, product_id, image_url).await {
                tracing::warn!(product_id, error = %e, "variant image attach failed");
            }
        }
    }
    Ok(())
}

/// Attaches an image to the most recently created variant for the product.
///
/// Ordered by `created_at DESC, id DESC` so that the first row is always
/// the latest, even when multiple variants share a creation timestamp.
/// Rows are imported strictly sequentially, so the freshest variant is the
/// one just inserted by [`insert_variants`].
async fn attach_latest_variant_image(
    pool: &PgPool,
    product_id: i64,
    image_url: &str,
) -> Result<(), DbError> {
    let variant_id: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM product_variants \
         WHERE product_id = $1 \
         ORDER BY created_at DESC, id DESC \
         LIMIT 1",
    )
    .bind(product_id)
    .fetch_optional(pool)
    .await?;

    if let Some(variant_id) = variant_id {
        sqlx::query("UPDATE product_variants SET image_url = $2, updated_at = NOW() WHERE id = $1")
            .bind(variant_id)
            .bind(image_url)
            .execute(pool)
            .await?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Child tables with a sort_order fallback shape
// ---------------------------------------------------------------------------

/// Inserts "reasons to buy" rows with `sort_order`, falling back to the
/// legacy shape without it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] when both shapes fail.
pub async fn insert_custom_reasons(
    pool: &PgPool,
    product_id: i64,
    reasons: &[String],
) -> Result<(), DbError> {
    match insert_custom_reasons_sorted(pool, product_id, reasons).await {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::warn!(product_id, error = %e, "custom reasons insert failed; retrying legacy shape");
            insert_custom_reasons_legacy(pool, product_id, reasons).await
        }
    }
}

async fn insert_custom_reasons_sorted(
    pool: &PgPool,
    product_id: i64,
    reasons: &[String],
) -> Result<(), DbError> {
    for (idx, reason) in reasons.iter().enumerate() {
        sqlx::query(
            "INSERT INTO product_custom_reasons (product_id, reason_text, sort_order) \
             VALUES ($1, $2, $3)",
        )
        .bind(product_id)
        .bind(reason)
        .bind(sort_order(idx))
        .execute(pool)
        .await?;
    }
    Ok(())
}

async fn insert_custom_reasons_legacy(
    pool: &PgPool,
    product_id: i64,
    reasons: &[String],
) -> Result<(), DbError> {
    for reason in reasons {
        sqlx::query("INSERT INTO product_custom_reasons (product_id, reason_text) VALUES ($1, $2)")
            .bind(product_id)
            .bind(reason)
            .execute(pool)
            .await?;
    }
    Ok(())
}

/// Inserts reasons-to-love rows with `sort_order`, falling back to the
/// legacy shape without it. `icon` has already been defaulted to `"check"`
/// during decoding.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] when both shapes fail.
pub async fn insert_reasons_to_love(
    pool: &PgPool,
    product_id: i64,
    reasons: &[ReasonToLove],
) -> Result<(), DbError> {
    match insert_reasons_to_love_sorted(pool, product_id, reasons).await {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::warn!(product_id, error = %e, "reasons-to-love insert failed; retrying legacy shape");
            insert_reasons_to_love_legacy(pool, product_id, reasons).await
        }
    }
}

async fn insert_reasons_to_love_sorted(
    pool: &PgPool,
    product_id: i64,
    reasons: &[ReasonToLove],
) -> Result<(), DbError> {
    for (idx, reason) in reasons.iter().enumerate() {
        sqlx::query(
            "INSERT INTO product_reasons_to_love \
                 (product_id, reason_text, description, smalltext, icon, sort_order) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(product_id)
        .bind(&reason.reason_text)
        .bind(&reason.description)
        .bind(&reason.smalltext)
        .bind(&reason.icon)
        .bind(sort_order(idx))
        .execute(pool)
        .await?;
    }
    Ok(())
}

async fn insert_reasons_to_love_legacy(
    pool: &PgPool,
    product_id: i64,
    reasons: &[ReasonToLove],
) -> Result<(), DbError> {
    for reason in reasons {
        sqlx::query(
            "INSERT INTO product_reasons_to_love \
                 (product_id, reason_text, description, smalltext, icon) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(product_id)
        .bind(&reason.reason_text)
        .bind(&reason.description)
        .bind(&reason.smalltext)
        .bind(&reason.icon)
        .execute(pool)
        .await?;
    }
    Ok(())
}

/// Inserts description paragraphs with `sort_order`, falling back to the
/// legacy shape without it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] when both shapes fail.
pub async fn insert_descriptions(
    pool: &PgPool,
    product_id: i64,
    paragraphs: &[DescriptionParagraph],
) -> Result<(), DbError> {
    match insert_descriptions_sorted(pool, product_id, paragraphs).await {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::warn!(product_id, error = %e, "descriptions insert failed; retrying legacy shape");
            insert_descriptions_legacy(pool, product_id, paragraphs).await
        }
    }
}

async fn insert_descriptions_sorted(
    pool: &PgPool,
    product_id: i64,
    paragraphs: &[DescriptionParagraph],
) -> Result<(), DbError> {
    for (idx, paragraph) in paragraphs.iter().enumerate() {
        sqlx::query(
            "INSERT INTO product_description_paragraphs \
                 (product_id, heading, content, image_url, sort_order) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(product_id)
        .bind(&paragraph.heading)
        .bind(&paragraph.content)
        .bind(&paragraph.image_url)
        .bind(sort_order(idx))
        .execute(pool)
        .await?;
    }
    Ok(())
}

async fn insert_descriptions_legacy(
    pool: &PgPool,
    product_id: i64,
    paragraphs: &[DescriptionParagraph],
) -> Result<(), DbError> {
    for paragraph in paragraphs {
        sqlx::query(
            "INSERT INTO product_description_paragraphs (product_id, heading, content, image_url) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(product_id)
        .bind(&paragraph.heading)
        .bind(&paragraph.content)
        .bind(&paragraph.image_url)
        .execute(pool)
        .await?;
    }
    Ok(())
}

/// Inserts FAQ rows with `sort_order`, falling back to the legacy shape
/// without it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] when both shapes fail.
pub async fn insert_faqs(pool: &PgPool, product_id: i64, faqs: &[Faq]) -> Result<(), DbError> {
    match insert_faqs_sorted(pool, product_id, faqs).await {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::warn!(product_id, error = %e, "faq insert failed; retrying legacy shape");
            insert_faqs_legacy(pool, product_id, faqs).await
        }
    }
}

async fn insert_faqs_sorted(pool: &PgPool, product_id: i64, faqs: &[Faq]) -> Result<(), DbError> {
    for (idx, faq) in faqs.iter().enumerate() {
        sqlx::query(
            "INSERT INTO product_faqs (product_id, question, answer, sort_order) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(product_id)
        .bind(&faq.question)
        .bind(&faq.answer)
        .bind(sort_order(idx))
        .execute(pool)
        .await?;
    }
    Ok(())
}

async fn insert_faqs_legacy(pool: &PgPool, product_id: i64, faqs: &[Faq]) -> Result<(), DbError> {
    for faq in faqs {
        sqlx::query("INSERT INTO product_faqs (product_id, question, answer) VALUES ($1, $2, $3)")
            .bind(product_id)
            .bind(&faq.question)
            .bind(&faq.answer)
            .execute(pool)
            .await?;
    }
    Ok(())
}

/// Inserts warranty sections; shares the titled-section shape with notices.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] when both shapes fail.
pub async fn insert_warranty_sections(
    pool: &PgPool,
    product_id: i64,
    sections: &[TitledSection],
) -> Result<(), DbError> {
    insert_titled_sections(pool, "product_warranty_sections", product_id, sections).await
}

/// Inserts important notices; shares the titled-section shape with warranty
/// sections.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] when both shapes fail.
pub async fn insert_notices(
    pool: &PgPool,
    product_id: i64,
    sections: &[TitledSection],
) -> Result<(), DbError> {
    insert_titled_sections(pool, "product_important_notices", product_id, sections).await
}

/// `table` is always one of the two titled-section table literals above,
/// never caller input.
async fn insert_titled_sections(
    pool: &PgPool,
    table: &str,
    product_id: i64,
    sections: &[TitledSection],
) -> Result<(), DbError> {
    match insert_titled_sections_sorted(pool, table, product_id, sections).await {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::warn!(product_id, table, error = %e, "titled section insert failed; retrying legacy shape");
            insert_titled_sections_legacy(pool, table, product_id, sections).await
        }
    }
}

async fn insert_titled_sections_sorted(
    pool: &PgPool,
    table: &str,
    product_id: i64,
    sections: &[TitledSection],
) -> Result<(), DbError> {
    let sql =
        format!("INSERT INTO {table} (product_id, title, content, sort_order) VALUES ($1, $2, $3, $4)");
    for (idx, section) in sections.iter().enumerate() {
        sqlx::query(&sql)
            .bind(product_id)
            .bind(&section.title)
            .bind(&section.content)
            .bind(sort_order(idx))
            .execute(pool)
            .await?;
    }
    Ok(())
}

async fn insert_titled_sections_legacy(
    pool: &PgPool,
    table: &str,
    product_id: i64,
    sections: &[TitledSection],
) -> Result<(), DbError> {
    let sql = format!("INSERT INTO {table} (product_id, title, content) VALUES ($1, $2, $3)");
    for section in sections {
        sqlx::query(&sql)
            .bind(product_id)
            .bind(&section.title)
            .bind(&section.content)
            .execute(pool)
            .await?;
    }
    Ok(())
}

/// Inserts popular-category rows (display names, not category foreign
/// keys) with `sort_order`, falling back to the legacy shape without it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] when both shapes fail.
pub async fn insert_popular_categories(
    pool: &PgPool,
    product_id: i64,
    names: &[String],
) -> Result<(), DbError> {
    match insert_popular_categories_sorted(pool, product_id, names).await {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::warn!(product_id, error = %e, "popular categories insert failed; retrying legacy shape");
            insert_popular_categories_legacy(pool, product_id, names).await
        }
    }
}

async fn insert_popular_categories_sorted(
    pool: &PgPool,
    product_id: i64,
    names: &[String],
) -> Result<(), DbError> {
    for (idx, name) in names.iter().enumerate() {
        sqlx::query(
            "INSERT INTO product_popular_categories (product_id, popular_category_name, sort_order) \
             VALUES ($1, $2, $3)",
        )
        .bind(product_id)
        .bind(name)
        .bind(sort_order(idx))
        .execute(pool)
        .await?;
    }
    Ok(())
}

async fn insert_popular_categories_legacy(
    pool: &PgPool,
    product_id: i64,
    names: &[String],
) -> Result<(), DbError> {
    for name in names {
        sqlx::query(
            "INSERT INTO product_popular_categories (product_id, popular_category_name) \
             VALUES ($1, $2)",
        )
        .bind(product_id)
        .bind(name)
        .execute(pool)
        .await?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Dimensions
// ---------------------------------------------------------------------------

/// Inserts the single dimensions record for a product.
///
/// Absent fields are omitted from the column list entirely rather than
/// bound as NULL, so the statement still succeeds against schema versions
/// that lack those columns. Callers only invoke this when at least one
/// dimension field was present on the row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_dimensions(
    pool: &PgPool,
    product_id: i64,
    dims: &DimensionsImport,
) -> Result<(), DbError> {
    let text_fields: [(&str, Option<&str>); 10] = [
        ("height", dims.height.as_deref()),
        ("length", dims.length.as_deref()),
        ("width", dims.width.as_deref()),
        ("mattress_size", dims.mattress_size.as_deref()),
        ("max_height", dims.max_height.as_deref()),
        ("weight_capacity", dims.weight_capacity.as_deref()),
        ("pocket_springs", dims.pocket_springs.as_deref()),
        ("comfort_layer", dims.comfort_layer.as_deref()),
        ("support_layer", dims.support_layer.as_deref()),
        ("dimension_disclaimer", dims.dimension_disclaimer.as_deref()),
    ];
    let flag_fields: [(&str, Option<bool>); 3] = [
        ("show_basic_dimensions", dims.show_basic_dimensions),
        ("show_mattress_specs", dims.show_mattress_specs),
        ("show_technical_specs", dims.show_technical_specs),
    ];

    let mut builder =
        sqlx::QueryBuilder::<sqlx::Postgres>::new("INSERT INTO product_dimensions (product_id");
    for (column, value) in &text_fields {
        if value.is_some() {
            builder.push(", ");
            builder.push(column);
        }
    }
    for (column, value) in &flag_fields {
        if value.is_some() {
            builder.push(", ");
            builder.push(column);
        }
    }

    builder.push(") VALUES (");
    {
        let mut values = builder.separated(", ");
        values.push_bind(product_id);
        for (_, value) in text_fields {
            if let Some(value) = value {
                values.push_bind(value.to_owned());
            }
        }
        for (_, value) in flag_fields {
            if let Some(value) = value {
                values.push_bind(value);
            }
        }
    }
    builder.push(")");

    builder.build().execute(pool).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Read helpers
// ---------------------------------------------------------------------------

/// Lists a product's images in stored sort order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_product_images(
    pool: &PgPool,
    product_id: i64,
) -> Result<Vec<ProductImageRow>, DbError> {
    Ok(sqlx::query_as::<_, ProductImageRow>(
        "SELECT id, product_id, image_url, is_main_image, sort_order, created_at \
         FROM product_images \
         WHERE product_id = $1 \
         ORDER BY sort_order ASC, id ASC",
    )
    .bind(product_id)
    .fetch_all(pool)
    .await?)
}

/// Lists a product's variants in creation order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_product_variants(
    pool: &PgPool,
    product_id: i64,
) -> Result<Vec<VariantRow>, DbError> {
    Ok(sqlx::query_as::<_, VariantRow>(
        "SELECT id, product_id, sku, sdi_number, original_price, current_price, \
                color, depth, firmness, size, length, width, height, availability, \
                image_url, created_at, updated_at \
         FROM product_variants \
         WHERE product_id = $1 \
         ORDER BY id ASC",
    )
    .bind(product_id)
    .fetch_all(pool)
    .await?)
}

fn sort_order(idx: usize) -> i32 {
    i32::try_from(idx).unwrap_or(i32::MAX)
}
