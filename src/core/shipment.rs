//! Shipment business logic - Destination details for delivering an order.

use crate::{
    entities::{Order, Shipment, shipment},
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Shipping details as entered by the operator.
#[derive(Debug, Clone, Default)]
pub struct NewShipment {
    /// Order being shipped
    pub order_id: i64,
    /// Person receiving the package
    pub recipient: String,
    /// Street and number
    pub street: String,
    /// City
    pub city: String,
    /// State or province
    pub state: String,
    /// Postal code
    pub postal_code: String,
    /// Contact phone
    pub phone: String,
}

/// Records where an order is shipped. Each order has at most one shipment.
///
/// # Errors
/// - [`Error::Validation`] if the recipient is blank
/// - [`Error::OrderNotFound`] if the order does not exist
/// - [`Error::ShipmentExists`] if the order already has a shipment
#[instrument(skip(db, new), fields(order_id = new.order_id))]
pub async fn record_shipment(db: &DatabaseConnection, new: NewShipment) -> Result<shipment::Model> {
    if new.recipient.trim().is_empty() {
        return Err(Error::Validation {
            message: "Recipient cannot be empty".to_string(),
        });
    }

    let order_id = new.order_id;
    let txn = db.begin().await?;

    if Order::find_by_id(order_id).one(&txn).await?.is_none() {
        return Err(Error::OrderNotFound { order_id });
    }
    if get_shipment_for_order(&txn, order_id).await?.is_some() {
        return Err(Error::ShipmentExists { order_id });
    }

    let shipment = shipment::ActiveModel {
        order_id: Set(order_id),
        recipient: Set(new.recipient.trim().to_string()),
        street: Set(new.street.trim().to_string()),
        city: Set(new.city.trim().to_string()),
        state: Set(new.state.trim().to_string()),
        postal_code: Set(new.postal_code.trim().to_string()),
        phone: Set(new.phone.trim().to_string()),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(order_id, shipment_id = shipment.id, "Shipment recorded");
    Ok(shipment)
}

/// The shipment recorded for an order, if any.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_shipment_for_order<C>(db: &C, order_id: i64) -> Result<Option<shipment::Model>>
where
    C: ConnectionTrait,
{
    Shipment::find()
        .filter(shipment::Column::OrderId.eq(order_id))
        .one(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use rust_decimal_macros::dec;

    fn shipment_for(order_id: i64) -> NewShipment {
        NewShipment {
            order_id,
            recipient: "Ana López".to_string(),
            street: "Av. Reforma 100".to_string(),
            city: "CDMX".to_string(),
            state: "CDMX".to_string(),
            postal_code: "06600".to_string(),
            phone: "555-0100".to_string(),
        }
    }

    #[tokio::test]
    async fn test_record_and_get_shipment() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_product(&db, "Aventus", dec!(10)).await?;
        let order = create_test_order(&db, &[("Aventus", dec!(1))]).await?;

        let shipment = record_shipment(&db, shipment_for(order.order.id)).await?;
        assert_eq!(shipment.postal_code, "06600");

        let found = get_shipment_for_order(&db, order.order.id).await?.unwrap();
        assert_eq!(found.id, shipment.id);
        assert!(get_shipment_for_order(&db, 999).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_one_shipment_per_order() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_product(&db, "Aventus", dec!(10)).await?;
        let order = create_test_order(&db, &[("Aventus", dec!(1))]).await?;

        record_shipment(&db, shipment_for(order.order.id)).await?;
        let second = record_shipment(&db, shipment_for(order.order.id)).await;
        assert!(matches!(
            second.unwrap_err(),
            Error::ShipmentExists { order_id } if order_id == order.order.id
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_shipment_requires_order_and_recipient() -> Result<()> {
        let db = setup_test_db().await?;

        let missing = record_shipment(&db, shipment_for(12)).await;
        assert!(matches!(missing.unwrap_err(), Error::OrderNotFound { order_id: 12 }));

        let mut blank = shipment_for(12);
        blank.recipient = "  ".to_string();
        let result = record_shipment(&db, blank).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
        Ok(())
    }
}
