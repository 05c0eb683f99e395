//! Order line entity - One product reservation inside an order.
//!
//! `unit_cost` is a snapshot of the product price taken when the line was created, and
//! `line_total` is always `quantity * unit_cost`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order line database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_lines")]
pub struct Model {
    /// Unique identifier for the line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Order this line belongs to
    pub order_id: i64,
    /// Name of the reserved product
    pub product_name: String,
    /// Reserved quantity
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub quantity: Decimal,
    /// Price per unit at the time the line was created
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub unit_cost: Decimal,
    /// `quantity * unit_cost`
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub line_total: Decimal,
}

/// Defines relationships between `OrderLine` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one order
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
