//! Unified error type for decant-desk.
//!
//! Domain errors (`ProductNotFound`, `InsufficientStock`, `InvalidQuantity`, ...) are
//! recoverable: the bot layer shows their `Display` text to the operator.

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Product '{name}' not found")]
    ProductNotFound { name: String },

    #[error("Order #{order_id} not found")]
    OrderNotFound { order_id: i64 },

    #[error("Order line {line_id} not found")]
    LineNotFound { line_id: i64 },

    #[error("Not enough stock for '{product}': available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: Decimal,
        requested: Decimal,
    },

    #[error("Invalid quantity: '{value}'")]
    InvalidQuantity { value: String },

    #[error("Invalid amount: '{value}'")]
    InvalidAmount { value: String },

    #[error("{message}")]
    Validation { message: String },

    #[error("A shipment is already recorded for order #{order_id}")]
    ShipmentExists { order_id: i64 },

    #[error("Receipt rendering failed: {message}")]
    Receipt { message: String },

    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Discord error: {0}")]
    Discord(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Discord(Box::new(value))
    }
}

impl Error {
    /// Whether the error comes from operator input or business rules, as opposed to the
    /// database, filesystem or Discord.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::ProductNotFound { .. }
                | Self::OrderNotFound { .. }
                | Self::LineNotFound { .. }
                | Self::InsufficientStock { .. }
                | Self::InvalidQuantity { .. }
                | Self::InvalidAmount { .. }
                | Self::Validation { .. }
                | Self::ShipmentExists { .. }
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
