//! Offline unit tests for mattdb-db pool configuration and row types.
//! These tests do not require a live database connection.

use mattdb_core::{AppConfig, Environment};
use mattdb_db::{CategoryRow, PoolConfig, ProductImageRow, VariantRow};
use rust_decimal::Decimal;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        rate_limit_max_requests: 120,
        rate_limit_window_secs: 60,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`CategoryRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn category_row_has_expected_fields() {
    use chrono::Utc;

    let row = CategoryRow {
        id: 1_i64,
        name: "Mattresses".to_string(),
        slug: "mattresses".to_string(),
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    assert_eq!(row.id, 1);
    assert_eq!(row.slug, "mattresses");
    assert!(row.is_active);
}

/// Compile-time smoke test: confirm that [`VariantRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn variant_row_has_expected_fields() {
    use chrono::Utc;

    let row = VariantRow {
        id: 42_i64,
        product_id: 7_i64,
        sku: Some("SKU1".to_string()),
        sdi_number: None,
        original_price: Decimal::new(39900, 2),
        current_price: Decimal::new(29900, 2),
        color: None,
        depth: None,
        firmness: Some("Medium".to_string()),
        size: Some("Double".to_string()),
        length: None,
        width: None,
        height: None,
        availability: true,
        image_url: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    assert_eq!(row.id, 42);
    assert_eq!(row.product_id, 7);
    assert_eq!(row.sku.as_deref(), Some("SKU1"));
    assert_eq!(row.current_price, Decimal::new(29900, 2));
    assert!(row.availability);
}

#[test]
fn product_image_row_has_expected_fields() {
    use chrono::Utc;

    let row = ProductImageRow {
        id: 9_i64,
        product_id: 7_i64,
        image_url: "/products/cloud-nine/main.jpg".to_string(),
        is_main_image: true,
        sort_order: 0,
        created_at: Utc::now(),
    };

    assert!(row.is_main_image);
    assert_eq!(row.sort_order, 0);
}
