//! Application settings loading from config.toml
//!
//! The settings file names the business shown on receipts, an optional logo, the default
//! receipt format, and an optional list of products used to seed an empty catalog.

use crate::{
    core::receipt::ReceiptFormat,
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Business name printed at the top of every receipt
    pub business_name: String,
    /// Optional logo drawn in the top-right corner of receipts
    pub logo_path: Option<PathBuf>,
    /// Format used by `/order receipt` when none is given
    pub default_receipt_format: ReceiptFormat,
    /// Products inserted into the catalog at start-up when missing
    pub products: Vec<ProductSeed>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            business_name: "H Decants".to_string(),
            logo_path: None,
            default_receipt_format: ReceiptFormat::Pdf,
            products: Vec::new(),
        }
    }
}

/// Configuration for a single seeded product
#[derive(Debug, Clone, Deserialize)]
pub struct ProductSeed {
    /// Catalog name
    pub name: String,
    /// Price per unit
    pub unit_cost: Decimal,
    /// Initial available quantity
    #[serde(default)]
    pub available_quantity: Decimal,
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid or a field has the wrong type
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    debug!("Loading settings from {:?}", path_ref);

    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_settings(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

fn parse_settings(contents: &str) -> std::result::Result<Settings, toml::de::Error> {
    toml::from_str(contents)
}

/// Loads settings from `DECANT_CONFIG` (default `./config.toml`).
///
/// A missing file is not an error: the built-in defaults are used instead.
pub fn load_default_settings() -> Result<Settings> {
    let path = std::env::var("DECANT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    if !Path::new(&path).exists() {
        info!("No config file at {path}, using default settings");
        return Ok(Settings::default());
    }

    load_settings(&path)
}
