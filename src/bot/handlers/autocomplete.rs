//! Autocomplete handlers for Discord slash command parameters.
//!
//! This module suggests product names, order statuses and receipt formats as the user
//! types.

use crate::{bot::BotData, core::product, entities::OrderStatus, errors::Error};

/// Discord shows at most 25 suggestions.
const MAX_SUGGESTIONS: usize = 25;

fn matching<'a>(options: impl IntoIterator<Item = &'a str>, partial: &str) -> Vec<String> {
    let partial_lower = partial.to_lowercase();
    options
        .into_iter()
        .filter(|option| option.to_lowercase().contains(&partial_lower))
        .map(str::to_string)
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Provides autocomplete suggestions for product names.
///
/// Queries the catalog for products whose name contains the user's partial input and
/// returns up to 25 names, alphabetically.
pub async fn autocomplete_product_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let db = &ctx.data().database;

    let Ok(products) = product::search_products(db, partial).await else {
        return Vec::new();
    };

    products
        .into_iter()
        .map(|prod| prod.name)
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Provides autocomplete suggestions for order statuses, in lifecycle order.
pub async fn autocomplete_status(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(OrderStatus::ALL.iter().map(|status| status.label()), partial)
}

/// Provides autocomplete suggestions for receipt formats.
pub async fn autocomplete_receipt_format(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(["pdf", "png"], partial)
}
