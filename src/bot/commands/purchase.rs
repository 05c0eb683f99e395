//! Purchase Discord commands - record inbound stock and review past purchases.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            commands::utils::{parse_amount, parse_date, truncate_for_embed},
            handlers::autocomplete,
        },
        core::{
            purchase::{self, NewPurchase},
            receipt::format_money,
            stock,
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Parent command for supplier purchases.
    #[poise::command(slash_command, subcommands("purchase_record", "purchase_list"))]
    pub async fn purchase(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Purchase command. Available subcommands:\n\
            `/purchase record` - Record bought stock, optionally adding it to the catalog\n\
            `/purchase list` - List recorded purchases";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Records a purchase from a supplier.
    #[poise::command(slash_command, rename = "record")]
    #[allow(clippy::too_many_arguments)]
    pub async fn purchase_record(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product bought"]
        #[autocomplete = "autocomplete::autocomplete_product_name"]
        product: String,
        #[description = "Units received (ml)"] pieces: String,
        #[description = "Total amount paid"] cost: String,
        #[description = "Supplier or origin"] source: String,
        #[description = "Add the units to the catalog stock"] add_to_catalog: bool,
        #[description = "Sale price per ml, needed when the product is new"] unit_cost: Option<
            String,
        >,
        #[description = "Delivery status (defaults to Received)"] status: Option<String>,
        #[description = "Payment status (defaults to Paid)"] payment_status: Option<String>,
        #[description = "Purchase date as YYYY-MM-DD (defaults to today)"] date: Option<String>,
    ) -> Result<()> {
        let new = NewPurchase {
            product_name: product,
            pieces: stock::parse_quantity(&pieces)?,
            cost: parse_amount(&cost)?,
            status: status.unwrap_or_else(|| "Received".to_string()),
            date: parse_date(date.as_deref())?,
            source,
            payment_status: payment_status.unwrap_or_else(|| "Paid".to_string()),
            add_to_catalog,
            unit_cost: unit_cost.as_deref().map(parse_amount).transpose()?,
        };

        let recorded = purchase::record_purchase(&ctx.data().database, new).await?;

        let mut message = format!(
            "✅ Purchase recorded: {} ml of **{}** for {}.",
            recorded.purchase.pieces.normalize(),
            recorded.purchase.product_name,
            format_money(recorded.purchase.cost)
        );
        if recorded.created_product {
            message.push_str(" New product added to the catalog.");
        }
        if let Some(available) = recorded.available_after {
            write!(message, " Stock is now {} ml.", available.normalize())?;
        }

        ctx.say(message).await?;
        Ok(())
    }

    /// Lists recorded purchases, newest first.
    #[poise::command(slash_command, rename = "list")]
    pub async fn purchase_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let purchases = purchase::list_purchases(&ctx.data().database).await?;

        if purchases.is_empty() {
            ctx.say("No purchases recorded yet. Use `/purchase record` to add one!")
                .await?;
            return Ok(());
        }

        let mut description = String::new();
        for p in &purchases {
            writeln!(
                description,
                "{} · **{}** · {} ml · {} · {} · {} / {}{}",
                p.date.format("%Y-%m-%d"),
                p.product_name,
                p.pieces.normalize(),
                format_money(p.cost),
                p.source,
                p.status,
                p.payment_status,
                if p.add_to_catalog { " · 📦" } else { "" }
            )?;
        }

        let embed = serenity::CreateEmbed::default()
            .title("**Purchases**")
            .color(0x0058_65F2)
            .description(truncate_for_embed(&description));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
