//! Shipment entity - Destination details for delivering an order.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Shipment database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shipments")]
pub struct Model {
    /// Unique identifier for the shipment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Order being shipped (at most one shipment per order)
    #[sea_orm(unique)]
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
    /// When the shipment was recorded
    pub created_at: DateTime,
}

/// Defines relationships between Shipment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each shipment belongs to one order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
