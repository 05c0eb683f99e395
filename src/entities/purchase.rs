//! Purchase entity - Inbound stock bought from a supplier.
//!
//! Purchases are append-only. When `add_to_catalog` is set, recording the purchase also
//! creates the product or increases its available quantity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Purchase database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchases")]
pub struct Model {
    /// Unique identifier for the purchase
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Product that was bought
    pub product_name: String,
    /// Units received
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub pieces: Decimal,
    /// Total amount paid to the supplier
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub cost: Decimal,
    /// Delivery status, free text (e.g. "Ordered", "Received")
    pub status: String,
    /// Purchase date
    pub date: Date,
    /// Supplier or origin
    pub source: String,
    /// Payment status, free text (e.g. "Paid", "Owed")
    pub payment_status: String,
    /// Whether the purchase fed the product catalog
    pub add_to_catalog: bool,
    /// When the purchase was recorded
    pub created_at: DateTime,
}

/// Purchases reference products by name only
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
