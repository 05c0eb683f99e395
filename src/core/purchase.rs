//! Purchase business logic - Records inbound stock bought from suppliers.
//!
//! A purchase flagged `add_to_catalog` feeds the product catalog in the same transaction:
//! the pieces are added to an existing product's available quantity, or a new product is
//! created with them.

use crate::{
    core::{
        product,
        stock::{self, StockLedger},
    },
    entities::{Purchase, purchase},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// A purchase as entered by the operator.
#[derive(Debug, Clone)]
pub struct NewPurchase {
    /// Product bought
    pub product_name: String,
    /// Units received (must be above zero)
    pub pieces: Decimal,
    /// Amount paid to the supplier
    pub cost: Decimal,
    /// Delivery status, free text
    pub status: String,
    /// Purchase date
    pub date: NaiveDate,
    /// Supplier or origin
    pub source: String,
    /// Payment status, free text
    pub payment_status: String,
    /// Feed the pieces into the catalog
    pub add_to_catalog: bool,
    /// Sale price per unit, required when the purchase creates a new product
    pub unit_cost: Option<Decimal>,
}

/// Result of recording a purchase.
#[derive(Debug, Clone)]
pub struct RecordedPurchase {
    /// The stored purchase row
    pub purchase: purchase::Model,
    /// Available quantity of the product afterwards, when the catalog was updated
    pub available_after: Option<Decimal>,
    /// Whether a new product was created
    pub created_product: bool,
}

fn validate(new: &NewPurchase) -> Result<()> {
    if new.product_name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Product name cannot be empty".to_string(),
        });
    }
    stock::validate_positive_quantity(new.pieces)?;
    if new.cost < Decimal::ZERO {
        return Err(Error::InvalidAmount {
            value: new.cost.to_string(),
        });
    }
    if let Some(unit_cost) = new.unit_cost.filter(|cost| *cost < Decimal::ZERO) {
        return Err(Error::InvalidAmount {
            value: unit_cost.to_string(),
        });
    }
    Ok(())
}

/// Records a purchase and, when flagged, adds its pieces to the catalog.
///
/// # Errors
/// - [`Error::Validation`] for a blank product name, or a new product without a sale price
/// - [`Error::InvalidQuantity`] unless `pieces` is above zero
/// - [`Error::InvalidAmount`] for a negative cost or sale price
#[instrument(skip(db, new), fields(product = %new.product_name))]
pub async fn record_purchase(db: &DatabaseConnection, new: NewPurchase) -> Result<RecordedPurchase> {
    validate(&new)?;
    let product_name = new.product_name.trim().to_string();

    let txn = db.begin().await?;

    let mut available_after = None;
    let mut created_product = false;
    if new.add_to_catalog {
        if let Some(existing) = product::get_product_by_name(&txn, &product_name).await? {
            let mut ledger = StockLedger::from_products([&existing]);
            available_after = Some(ledger.release(&product_name, new.pieces)?);
            stock::apply_ledger(&txn, &ledger).await?;
        } else {
            let unit_cost = new.unit_cost.ok_or_else(|| Error::Validation {
                message: format!("'{product_name}' is not in the catalog yet; give it a sale price"),
            })?;
            let created = product::insert_product(&txn, &product_name, unit_cost, new.pieces).await?;
            available_after = Some(created.available_quantity);
            created_product = true;
        }
    }

    let purchase = purchase::ActiveModel {
        product_name: Set(product_name),
        pieces: Set(new.pieces),
        cost: Set(new.cost),
        status: Set(new.status.trim().to_string()),
        date: Set(new.date),
        source: Set(new.source.trim().to_string()),
        payment_status: Set(new.payment_status.trim().to_string()),
        add_to_catalog: Set(new.add_to_catalog),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(
        purchase_id = purchase.id,
        pieces = %purchase.pieces,
        created_product,
        "Purchase recorded"
    );
    Ok(RecordedPurchase {
        purchase,
        available_after,
        created_product,
    })
}

/// Lists purchases, most recent first.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_purchases(db: &DatabaseConnection) -> Result<Vec<purchase::Model>> {
    Purchase::find()
        .order_by_desc(purchase::Column::Date)
        .order_by_desc(purchase::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn purchase_of(name: &str, pieces: Decimal, add_to_catalog: bool) -> NewPurchase {
        NewPurchase {
            product_name: name.to_string(),
            pieces,
            cost: dec!(250),
            status: "Received".to_string(),
            date: test_date(),
            source: "Supplier".to_string(),
            payment_status: "Paid".to_string(),
            add_to_catalog,
            unit_cost: None,
        }
    }

    #[tokio::test]
    async fn test_record_purchase_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = record_purchase(&db, purchase_of(" ", dec!(1), false)).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let result = record_purchase(&db, purchase_of("Aventus", Decimal::ZERO, false)).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidQuantity { .. }));

        let mut negative_cost = purchase_of("Aventus", dec!(1), false);
        negative_cost.cost = dec!(-1);
        let result = record_purchase(&db, negative_cost).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_purchase_without_catalog_leaves_stock() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_product(&db, "Aventus", dec!(10)).await?;

        let recorded = record_purchase(&db, purchase_of("Aventus", dec!(100), false)).await?;
        assert_eq!(recorded.available_after, None);
        assert!(!recorded.created_product);
        assert_eq!(available(&db, "Aventus").await?, dec!(10));
        Ok(())
    }

    #[tokio::test]
    async fn test_purchase_increments_existing_product() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_product(&db, "Aventus", dec!(10)).await?;

        let recorded = record_purchase(&db, purchase_of("Aventus", dec!(100), true)).await?;
        assert_eq!(recorded.available_after, Some(dec!(110)));
        assert!(!recorded.created_product);
        assert_eq!(available(&db, "Aventus").await?, dec!(110));
        Ok(())
    }

    #[tokio::test]
    async fn test_purchase_creates_product() -> Result<()> {
        let db = setup_test_db().await?;

        let missing_price = record_purchase(&db, purchase_of("Layton", dec!(75), true)).await;
        assert!(matches!(missing_price.unwrap_err(), Error::Validation { .. }));
        assert!(list_purchases(&db).await?.is_empty());

        let mut new = purchase_of("Layton", dec!(75), true);
        new.unit_cost = Some(dec!(9.5));
        let recorded = record_purchase(&db, new).await?;
        assert!(recorded.created_product);

        let product = crate::core::product::get_product_by_name(&db, "Layton")
            .await?
            .unwrap();
        assert_eq!(product.unit_cost, dec!(9.5));
        assert_eq!(product.available_quantity, dec!(75));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_purchases_newest_first() -> Result<()> {
        let db = setup_test_db().await?;
        let mut older = purchase_of("A", dec!(1), false);
        older.date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        record_purchase(&db, older).await?;
        record_purchase(&db, purchase_of("B", dec!(1), false)).await?;

        let names: Vec<_> = list_purchases(&db)
            .await?
            .into_iter()
            .map(|p| p.product_name)
            .collect();
        assert_eq!(names, vec!["B", "A"]);
        Ok(())
    }
}
