//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod order;
pub mod order_line;
pub mod product;
pub mod purchase;
pub mod shipment;

// Re-export specific types to avoid conflicts
pub use order::{
    Column as OrderColumn, Entity as Order, Model as OrderModel, OrderStatus,
};
pub use order_line::{Column as OrderLineColumn, Entity as OrderLine, Model as OrderLineModel};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use purchase::{Column as PurchaseColumn, Entity as Purchase, Model as PurchaseModel};
pub use shipment::{Column as ShipmentColumn, Entity as Shipment, Model as ShipmentModel};
