//! Catalog business logic - Handles all product-related operations.
//!
//! This module provides functions for creating, looking up, repricing, and seeding
//! products. Stock levels are not edited here: available quantities only change through
//! the stock ledger (`core::stock`) as orders and purchases are recorded.

use crate::{
    config::settings::ProductSeed,
    entities::{Product, product},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, QueryOrder, Set, prelude::*};
use tracing::info;

/// Retrieves every product, ordered alphabetically by name.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Products whose name contains `term`, case-insensitively. An empty term matches all.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn search_products(db: &DatabaseConnection, term: &str) -> Result<Vec<product::Model>> {
    let term = term.trim().to_lowercase();
    let products = get_all_products(db).await?;
    Ok(products
        .into_iter()
        .filter(|p| p.name.to_lowercase().contains(&term))
        .collect())
}

/// Finds a product by its exact name.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product_by_name<C>(db: &C, name: &str) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find()
        .filter(product::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

fn validate_product_fields(name: &str, unit_cost: Decimal, available: Decimal) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Product name cannot be empty".to_string(),
        });
    }
    if unit_cost < Decimal::ZERO {
        return Err(Error::InvalidAmount {
            value: unit_cost.to_string(),
        });
    }
    crate::core::stock::validate_quantity(available)?;
    Ok(())
}

/// Inserts a product row. Shared by [`create_product`] and purchases that add to the catalog.
pub(crate) async fn insert_product<C>(
    db: &C,
    name: &str,
    unit_cost: Decimal,
    available_quantity: Decimal,
) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    validate_product_fields(name, unit_cost, available_quantity)?;

    let now = chrono::Utc::now().naive_utc();
    let product = product::ActiveModel {
        name: Set(name.trim().to_string()),
        unit_cost: Set(unit_cost),
        available_quantity: Set(available_quantity),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    product.insert(db).await.map_err(Into::into)
}

/// Creates a new product with the specified price and starting stock.
///
/// # Errors
/// Returns an error if:
/// - The product name is empty or whitespace-only
/// - The unit cost or the available quantity is negative
/// - A product with the same name already exists, or the insert fails
pub async fn create_product(
    db: &DatabaseConnection,
    name: &str,
    unit_cost: Decimal,
    available_quantity: Decimal,
) -> Result<product::Model> {
    let product = insert_product(db, name, unit_cost, available_quantity).await?;
    info!(product = %product.name, %unit_cost, %available_quantity, "Product created");
    Ok(product)
}

/// Changes the price of a product. Existing order lines keep their price snapshot.
///
/// # Errors
/// Returns an error if the price is negative, the product does not exist, or the update
/// fails.
pub async fn update_unit_cost(
    db: &DatabaseConnection,
    name: &str,
    unit_cost: Decimal,
) -> Result<product::Model> {
    if unit_cost < Decimal::ZERO {
        return Err(Error::InvalidAmount {
            value: unit_cost.to_string(),
        });
    }

    let mut product: product::ActiveModel = get_product_by_name(db, name)
        .await?
        .ok_or_else(|| Error::ProductNotFound {
            name: name.to_string(),
        })?
        .into();

    product.unit_cost = Set(unit_cost);
    product.updated_at = Set(chrono::Utc::now().naive_utc());

    product.update(db).await.map_err(Into::into)
}

/// Inserts configured products that are not in the catalog yet. Existing products are left
/// untouched so that seeding never resets stock. Returns the number of products inserted.
///
/// # Errors
/// Returns an error if a seed entry is invalid or a database operation fails.
pub async fn seed_products(db: &DatabaseConnection, seeds: &[ProductSeed]) -> Result<usize> {
    let mut inserted = 0;
    for seed in seeds {
        if get_product_by_name(db, seed.name.trim()).await?.is_some() {
            continue;
        }
        insert_product(db, &seed.name, seed.unit_cost, seed.available_quantity).await?;
        inserted += 1;
    }

    if inserted > 0 {
        info!("Seeded {inserted} product(s) from configuration");
    }
    Ok(inserted)
}
