//! Product entity - A catalog entry (one perfume) sold by quantity.
//!
//! `available_quantity` is the stock still free to be reserved by order lines. It is only
//! mutated through the stock ledger in `core::stock`, never written directly by commands.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Catalog name (e.g., "Aventus"); unique, used as the key by order lines
    #[sea_orm(unique)]
    pub name: String,
    /// Price charged per unit (per ml for decants)
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub unit_cost: Decimal,
    /// Quantity still available for new reservations
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub available_quantity: Decimal,
    /// When the product was created
    pub created_at: DateTime,
    /// When the product was last modified
    pub updated_at: DateTime,
}

/// Products are referenced by name from order lines and purchases, not by foreign key
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
