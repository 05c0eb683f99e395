//! Shared test utilities for decant-desk.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        order::{self, NewLine, NewOrder, OrderDetails},
        product,
    },
    entities::{self, OrderStatus},
    errors::Result,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test product with a unit cost of 10 and the given available quantity.
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
    available_quantity: Decimal,
) -> Result<entities::product::Model> {
    product::create_product(db, name, Decimal::TEN, available_quantity).await
}

/// Creates a test product with a custom unit cost.
pub async fn create_custom_product(
    db: &DatabaseConnection,
    name: &str,
    unit_cost: Decimal,
    available_quantity: Decimal,
) -> Result<entities::product::Model> {
    product::create_product(db, name, unit_cost, available_quantity).await
}

/// Fixed date used by order fixtures.
#[must_use]
pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).unwrap_or_default()
}

/// Creates a Pending order for "Test Customer" dated [`test_date`].
///
/// `lines` are `(product name, quantity)` pairs.
pub async fn create_test_order(
    db: &DatabaseConnection,
    lines: &[(&str, Decimal)],
) -> Result<OrderDetails> {
    order::create_order(
        db,
        NewOrder {
            customer_name: "Test Customer".to_string(),
            date: test_date(),
            status: OrderStatus::Pending,
            lines: lines
                .iter()
                .map(|(name, quantity)| NewLine::new(*name, *quantity))
                .collect(),
        },
    )
    .await
}

/// Current available quantity of a product, failing the test if it does not exist.
pub async fn available(db: &DatabaseConnection, name: &str) -> Result<Decimal> {
    let product = product::get_product_by_name(db, name).await?.ok_or_else(|| {
        crate::errors::Error::ProductNotFound {
            name: name.to_string(),
        }
    })?;
    Ok(product.available_quantity)
}
