//! Order entity - The header of a customer order.
//!
//! Customer, date and status are stored once per order; the individual product
//! reservations live in `order_line`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Lifecycle status of an order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum OrderStatus {
    /// Price quote, not yet confirmed by the customer
    #[sea_orm(string_value = "Quote")]
    Quote,
    /// Confirmed, waiting for payment
    #[sea_orm(string_value = "Pending")]
    Pending,
    /// Paid, not yet prepared
    #[sea_orm(string_value = "Paid")]
    Paid,
    /// Decants being prepared
    #[sea_orm(string_value = "InProgress")]
    InProgress,
    /// Handed over to the customer
    #[sea_orm(string_value = "Delivered")]
    Delivered,
}

impl OrderStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Quote,
        Self::Pending,
        Self::Paid,
        Self::InProgress,
        Self::Delivered,
    ];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Quote => "Quote",
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::InProgress => "In Progress",
            Self::Delivered => "Delivered",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OrderStatus {
    type Err = crate::errors::Error;

    /// Accepts the English labels as well as their Spanish equivalents.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect();

        match normalized.as_str() {
            "quote" | "cotizacion" | "cotización" => Ok(Self::Quote),
            "pending" | "pendiente" => Ok(Self::Pending),
            "paid" | "pagado" => Ok(Self::Paid),
            "inprogress" | "enproceso" => Ok(Self::InProgress),
            "delivered" | "entregado" => Ok(Self::Delivered),
            _ => Err(crate::errors::Error::Validation {
                message: format!(
                    "Unknown order status '{s}'. Expected one of: Quote, Pending, Paid, In Progress, Delivered"
                ),
            }),
        }
    }
}

/// Order header database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Order number; assigned as max existing + 1 when the order is created
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    /// Customer the order belongs to
    pub customer_name: String,
    /// Order date
    pub date: Date,
    /// Current status, shared by every line of the order
    pub status: OrderStatus,
    /// When the order was created
    pub created_at: DateTime,
    /// When the order or any of its lines was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One order has many lines
    #[sea_orm(has_many = "super::order_line::Entity")]
    Lines,
    /// One order has at most one shipment
    #[sea_orm(has_one = "super::shipment::Entity")]
    Shipment,
}

impl Related<super::order_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
    }
}

impl Related<super::shipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shipment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
