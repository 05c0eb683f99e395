//! Core business logic - framework-agnostic operations on the catalog, orders, purchases
//! and shipments.
//!
//! Every function here takes a database connection and returns [`crate::errors::Result`];
//! nothing depends on Discord, so the same operations can back any other interface.

/// Order creation, editing, cloning and queries
pub mod order;
/// Product catalog operations
pub mod product;
/// Inbound stock purchases
pub mod purchase;
/// PDF and PNG receipts
pub mod receipt;
/// Shipping destinations
pub mod shipment;
/// Stock ledger kept in step with order lines
pub mod stock;
