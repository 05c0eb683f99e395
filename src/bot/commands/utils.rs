//! Parsing and formatting helpers shared by the Discord commands.

use crate::{
    core::{
        order::{NewLine, OrderDetails, SkipReason, SkippedLine},
        receipt::format_money,
        stock,
    },
    errors::{Error, Result},
};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Discord embed descriptions are capped at 4096 characters.
const EMBED_DESCRIPTION_LIMIT: usize = 4096;

/// Parses an operator-entered amount such as `"12.50"` or `"$1,200"`.
///
/// # Errors
/// Returns [`Error::InvalidAmount`] if the text is not a number or is negative.
pub fn parse_amount(text: &str) -> Result<Decimal> {
    let trimmed = text.trim();
    let digits = trimmed.strip_prefix('$').unwrap_or(trimmed).replace(',', "");
    match Decimal::from_str(digits.trim()) {
        Ok(amount) if amount >= Decimal::ZERO => Ok(amount),
        _ => Err(Error::InvalidAmount {
            value: trimmed.to_string(),
        }),
    }
}

/// Parses an item list such as `"Aventus=30, Baccarat Rouge 540=5"`.
///
/// Entries are separated by commas or new lines. The last `=` splits name from quantity,
/// so product names may contain `=` themselves.
///
/// # Errors
/// - [`Error::Validation`] if an entry has no `=` or no product name, or the list is empty
/// - [`Error::InvalidQuantity`] if a quantity is not a non-negative number
pub fn parse_items(text: &str) -> Result<Vec<NewLine>> {
    let mut lines = Vec::new();
    for entry in text.split([',', '\n', ';']).map(str::trim) {
        if entry.is_empty() {
            continue;
        }
        let Some((name, quantity)) = entry.rsplit_once('=') else {
            return Err(Error::Validation {
                message: format!("Expected `Product=quantity`, got `{entry}`"),
            });
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Validation {
                message: format!("Missing product name in `{entry}`"),
            });
        }
        lines.push(NewLine::new(name, stock::parse_quantity(quantity)?));
    }

    if lines.is_empty() {
        return Err(Error::Validation {
            message: "No items given; use `Product=quantity, Product=quantity`".to_string(),
        });
    }
    Ok(lines)
}

/// Parses a `YYYY-MM-DD` date, defaulting to today.
///
/// # Errors
/// Returns [`Error::Validation`] if the text is not a valid date.
pub fn parse_date(text: Option<&str>) -> Result<NaiveDate> {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(today());
    };
    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| Error::Validation {
        message: format!("Invalid date `{text}`, use YYYY-MM-DD"),
    })
}

/// Today's date in the local time zone.
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Cuts text to fit an embed description.
#[must_use]
pub fn truncate_for_embed(text: &str) -> String {
    if text.chars().count() <= EMBED_DESCRIPTION_LIMIT {
        return text.to_string();
    }
    let mut short: String = text.chars().take(EMBED_DESCRIPTION_LIMIT - 2).collect();
    short.push_str("\n…");
    short
}

/// Header and lines of an order, one line per row with its id for editing.
#[must_use]
pub fn describe_order(details: &OrderDetails) -> String {
    let order = &details.order;
    let mut text = format!(
        "**Customer:** {}\n**Date:** {}\n**Status:** {}\n\n",
        order.customer_name,
        order.date.format("%Y-%m-%d"),
        order.status
    );

    if details.lines.is_empty() {
        text.push_str("_No lines_\n");
    }
    for line in &details.lines {
        text.push_str(&format!(
            "`#{}` **{}** - {} ml × {} = {}\n",
            line.id,
            line.product_name,
            line.quantity.normalize(),
            format_money(line.unit_cost),
            format_money(line.line_total)
        ));
    }
    text.push_str(&format!("\n**Total:** {}", format_money(details.total())));
    text
}

/// One line per skipped clone line.
#[must_use]
pub fn describe_skipped(skipped: &[SkippedLine]) -> String {
    skipped
        .iter()
        .map(|skip| match (skip.reason, skip.available) {
            (SkipReason::InsufficientStock, Some(available)) => format!(
                "⚠️ Skipped **{}**: wanted {} ml, only {} ml available",
                skip.product_name,
                skip.requested.normalize(),
                available.normalize()
            ),
            (SkipReason::InsufficientStock, None) => format!(
                "⚠️ Skipped **{}**: not enough stock",
                skip.product_name
            ),
            (SkipReason::ProductNotFound, _) => format!(
                "⚠️ Skipped **{}**: no longer in the catalog",
                skip.product_name
            ),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::{OrderModel, OrderStatus, order_line};
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("12.50").unwrap(), dec!(12.5));
        assert_eq!(parse_amount(" $1,200 ").unwrap(), dec!(1200));
        assert!(matches!(
            parse_amount("-3"),
            Err(Error::InvalidAmount { value }) if value == "-3"
        ));
        assert!(matches!(parse_amount("cheap"), Err(Error::InvalidAmount { .. })));
    }

    #[test]
    fn test_parse_items() {
        let lines = parse_items("Aventus=30, Baccarat Rouge 540 = 2.5\nAventus=0").unwrap();
        assert_eq!(
            lines,
            vec![
                NewLine::new("Aventus", dec!(30)),
                NewLine::new("Baccarat Rouge 540", dec!(2.5)),
                NewLine::new("Aventus", Decimal::ZERO),
            ]
        );

        let with_equals = parse_items("Eau=Fraiche=5").unwrap();
        assert_eq!(with_equals, vec![NewLine::new("Eau=Fraiche", dec!(5))]);
    }

    #[test]
    fn test_parse_items_errors() {
        assert!(matches!(parse_items("Aventus 30"), Err(Error::Validation { .. })));
        assert!(matches!(parse_items("=30"), Err(Error::Validation { .. })));
        assert!(matches!(parse_items(" , "), Err(Error::Validation { .. })));
        assert!(matches!(
            parse_items("Aventus=lots"),
            Err(Error::InvalidQuantity { .. })
        ));
        assert!(matches!(
            parse_items("Aventus=-1"),
            Err(Error::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date(Some("2025-03-14")).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
        );
        assert_eq!(parse_date(None).unwrap(), today());
        assert_eq!(parse_date(Some("  ")).unwrap(), today());
        assert!(matches!(
            parse_date(Some("14/03/2025")),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_truncate_for_embed() {
        assert_eq!(truncate_for_embed("short"), "short");
        let long = "x".repeat(5000);
        assert_eq!(truncate_for_embed(&long).chars().count(), EMBED_DESCRIPTION_LIMIT);
    }

    #[test]
    fn test_describe_order() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let now = date.and_hms_opt(12, 0, 0).unwrap();
        let details = OrderDetails {
            order: OrderModel {
                id: 3,
                customer_name: "Ana".to_string(),
                date,
                status: OrderStatus::InProgress,
                created_at: now,
                updated_at: now,
            },
            lines: vec![order_line::Model {
                id: 11,
                order_id: 3,
                product_name: "Aventus".to_string(),
                quantity: dec!(30),
                unit_cost: dec!(12.5),
                line_total: dec!(375),
            }],
        };

        let text = describe_order(&details);
        assert!(text.contains("**Status:** In Progress"));
        assert!(text.contains("`#11` **Aventus** - 30 ml × $12.50 = $375.00"));
        assert!(text.contains("$375.00\n\n**Total:**"));
        assert!(text.ends_with("**Total:** $375.00"));
    }

    #[test]
    fn test_describe_skipped() {
        let skipped = vec![
            SkippedLine {
                product_name: "B".to_string(),
                requested: dec!(30),
                available: Some(dec!(20)),
                reason: SkipReason::InsufficientStock,
            },
            SkippedLine {
                product_name: "Gone".to_string(),
                requested: dec!(1),
                available: None,
                reason: SkipReason::ProductNotFound,
            },
        ];
        assert_eq!(
            describe_skipped(&skipped),
            "⚠️ Skipped **B**: wanted 30 ml, only 20 ml available\n\
             ⚠️ Skipped **Gone**: no longer in the catalog"
        );
    }
}
