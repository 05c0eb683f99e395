//! Catalog Discord commands - add products, list stock, and change prices.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            commands::utils::{parse_amount, truncate_for_embed},
            handlers::autocomplete,
        },
        core::{product, receipt::format_money, stock},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Parent command for the product catalog.
    #[poise::command(
        slash_command,
        subcommands("catalog_add", "catalog_list", "catalog_price")
    )]
    pub async fn catalog(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Catalog command. Available subcommands:\n\
            `/catalog add` - Add a new product with its price and starting stock\n\
            `/catalog list` - List products with available stock\n\
            `/catalog price` - Change a product's price";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Adds a new product to the catalog.
    #[poise::command(slash_command, rename = "add")]
    pub async fn catalog_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Unique product name (e.g., 'Aventus')"] name: String,
        #[description = "Price per ml (e.g., 12.50)"] unit_cost: String,
        #[description = "Available quantity in ml. Defaults to 0."] available: Option<String>,
    ) -> Result<()> {
        let unit_cost = parse_amount(&unit_cost)?;
        let available = available
            .as_deref()
            .map(stock::parse_quantity)
            .transpose()?
            .unwrap_or_default();
        let db = &ctx.data().database;

        if product::get_product_by_name(db, name.trim()).await?.is_some() {
            ctx.say(format!(
                "⚠️ A product named '{}' already exists. Product names must be unique.",
                name.trim()
            ))
            .await?;
            return Ok(());
        }

        let created = product::create_product(db, &name, unit_cost, available).await?;
        ctx.say(format!(
            "✅ Product '{}' added at **{}** per ml with **{}** ml available.",
            created.name,
            format_money(created.unit_cost),
            created.available_quantity.normalize()
        ))
        .await?;
        Ok(())
    }

    /// Lists products with their price and available stock.
    #[poise::command(slash_command, rename = "list")]
    pub async fn catalog_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only show products whose name contains this text"] search: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let products = product::search_products(db, search.as_deref().unwrap_or_default()).await?;

        if products.is_empty() {
            ctx.say("No products found. Use `/catalog add` to create some!")
                .await?;
            return Ok(());
        }

        let mut description = String::new();
        for prod in &products {
            writeln!(
                description,
                "**{}** - {} per ml, {} ml available",
                prod.name,
                format_money(prod.unit_cost),
                prod.available_quantity.normalize()
            )?;
        }

        let embed = serenity::CreateEmbed::default()
            .title("**Catalog**")
            .color(0x0058_65F2)
            .description(truncate_for_embed(&description));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Changes the price of a product. Existing order lines keep their price.
    #[poise::command(slash_command, rename = "price")]
    pub async fn catalog_price(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product to reprice"]
        #[autocomplete = "autocomplete::autocomplete_product_name"]
        name: String,
        #[description = "New price per ml (e.g., 14.00)"] unit_cost: String,
    ) -> Result<()> {
        let unit_cost = parse_amount(&unit_cost)?;
        let db = &ctx.data().database;

        let updated = product::update_unit_cost(db, &name, unit_cost).await?;
        ctx.say(format!(
            "✅ Price for '{}' updated to **{}** per ml.",
            updated.name,
            format_money(updated.unit_cost)
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
