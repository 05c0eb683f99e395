//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Product catalog commands
pub mod catalog;

/// General utility commands
pub mod general;

/// Order commands
pub mod order;

/// Purchase commands
pub mod purchase;

/// Shipment commands
pub mod shipment;

/// Parsing and formatting helpers shared by commands
pub mod utils;

// Export commands
pub use catalog::*;
pub use general::*;
pub use order::*;
pub use purchase::*;
pub use shipment::*;
