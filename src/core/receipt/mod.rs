//! Receipt rendering - turns an order into a shareable PDF or PNG document.
//!
//! Rendering is a pure function of the [`Receipt`] data: no database access, and the only
//! file read is the optional logo. A logo that cannot be loaded is logged and skipped.

mod pdf;
mod png;

use crate::{
    core::order::OrderDetails,
    entities::OrderStatus,
    errors::{Error, Result},
};
use chrono::NaiveDate;
use image::DynamicImage;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use std::{fmt, path::Path, str::FromStr};
use tracing::{debug, warn};

/// Output format of a rendered receipt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptFormat {
    /// Portable Document Format
    #[default]
    Pdf,
    /// Raster image
    Png,
}

impl ReceiptFormat {
    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Png => "png",
        }
    }

    /// MIME type of the rendered bytes.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Png => "image/png",
        }
    }
}

impl fmt::Display for ReceiptFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ReceiptFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "png" => Ok(Self::Png),
            other => Err(Error::Validation {
                message: format!("Unknown receipt format '{other}', use pdf or png"),
            }),
        }
    }
}

/// One table row of a receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptLine {
    /// Product name
    pub product_name: String,
    /// Quantity (ml)
    pub quantity: Decimal,
    /// Unit cost snapshot
    pub unit_cost: Decimal,
    /// `quantity * unit_cost`
    pub line_total: Decimal,
}

/// Everything printed on a receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Heading printed above the order details
    pub business_name: String,
    /// Order number
    pub order_id: i64,
    /// Customer name
    pub customer_name: String,
    /// Order date
    pub date: NaiveDate,
    /// Order status
    pub status: OrderStatus,
    /// Rows in input order
    pub lines: Vec<ReceiptLine>,
}

/// A rendered receipt ready to be attached or saved.
#[derive(Debug, Clone)]
pub struct RenderedReceipt {
    /// Encoded document
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`
    pub content_type: &'static str,
    /// Suggested file name
    pub filename: String,
}

impl Receipt {
    /// Creates a receipt from raw values.
    #[must_use]
    pub fn new(
        business_name: impl Into<String>,
        order_id: i64,
        customer_name: impl Into<String>,
        date: NaiveDate,
        status: OrderStatus,
        lines: Vec<ReceiptLine>,
    ) -> Self {
        Self {
            business_name: business_name.into(),
            order_id,
            customer_name: customer_name.into(),
            date,
            status,
            lines,
        }
    }

    /// Creates a receipt for a stored order.
    #[must_use]
    pub fn from_order(business_name: impl Into<String>, details: &OrderDetails) -> Self {
        let lines = details
            .lines
            .iter()
            .map(|line| ReceiptLine {
                product_name: line.product_name.clone(),
                quantity: line.quantity,
                unit_cost: line.unit_cost,
                line_total: line.line_total,
            })
            .collect();

        Self::new(
            business_name,
            details.order.id,
            details.order.customer_name.clone(),
            details.order.date,
            details.order.status,
            lines,
        )
    }

    /// Sum of all line totals, rounded to cents.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines
            .iter()
            .map(|line| line.line_total)
            .sum::<Decimal>()
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// `Order_<id>_<customer without spaces>.<ext>`
    #[must_use]
    pub fn filename(&self, format: ReceiptFormat) -> String {
        let customer: String = self
            .customer_name
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        format!("Order_{}_{customer}.{}", self.order_id, format.extension())
    }

    /// Renders the receipt, drawing the logo at `logo` in the top-right corner when it can
    /// be loaded.
    ///
    /// # Errors
    /// Returns [`Error::Image`] or [`Error::Receipt`] if encoding the document fails.
    pub fn render(&self, format: ReceiptFormat, logo: Option<&Path>) -> Result<RenderedReceipt> {
        let logo = load_logo(logo);
        let bytes = match format {
            ReceiptFormat::Pdf => pdf::render(self, logo.as_ref())?,
            ReceiptFormat::Png => png::render(self, logo.as_ref())?,
        };

        debug!(
            order_id = self.order_id,
            %format,
            size = bytes.len(),
            "Receipt rendered"
        );
        Ok(RenderedReceipt {
            bytes,
            content_type: format.content_type(),
            filename: self.filename(format),
        })
    }
}

fn load_logo(path: Option<&Path>) -> Option<DynamicImage> {
    let path = path?;
    match image::open(path) {
        Ok(logo) => Some(logo),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not load receipt logo, rendering without it");
            None
        }
    }
}

/// `$1,234.50` style amount.
pub(crate) fn format_money(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((&text, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("{sign}${grouped}.{cents}")
}

/// Quantity without trailing zeros.
pub(crate) fn format_quantity(quantity: Decimal) -> String {
    quantity.normalize().to_string()
}

/// Header lines printed above the table.
fn header_lines(receipt: &Receipt) -> [String; 3] {
    [
        format!("Customer: {}", receipt.customer_name),
        format!("Date: {}", receipt.date.format("%Y-%m-%d")),
        format!("Status: {}", receipt.status.label()),
    ]
}
