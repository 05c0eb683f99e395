//! Order Discord commands - create, inspect, edit, clone and print customer orders.
//!
//! Every stock-affecting subcommand goes through `core::order`, so a rejected edit leaves
//! both the order and the catalog exactly as they were.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            commands::utils::{
                describe_order, describe_skipped, parse_date, parse_items, today,
                truncate_for_embed,
            },
            handlers::autocomplete,
        },
        core::{
            order::{self, NewLine, NewOrder, OrderDetails},
            receipt::{Receipt, ReceiptFormat},
            stock,
        },
        entities::OrderStatus,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Sends an order as an embed, with an optional note above it.
    async fn send_order(
        ctx: poise::Context<'_, BotData, Error>,
        details: &OrderDetails,
        note: Option<String>,
    ) -> Result<()> {
        let embed = serenity::CreateEmbed::default()
            .title(format!("Order #{}", details.order.id))
            .color(0x0058_65F2)
            .description(truncate_for_embed(&describe_order(details)));

        let mut reply = poise::CreateReply::default().embed(embed);
        if let Some(note) = note {
            reply = reply.content(note);
        }
        ctx.send(reply).await?;
        Ok(())
    }

    async fn require_order(
        db: &sea_orm::DatabaseConnection,
        order_id: i64,
    ) -> Result<OrderDetails> {
        order::get_order(db, order_id)
            .await?
            .ok_or(Error::OrderNotFound { order_id })
    }

    /// Parent command for customer orders.
    #[poise::command(
        slash_command,
        subcommands(
            "order_new",
            "order_show",
            "order_history",
            "order_add_line",
            "order_edit_line",
            "order_remove_line",
            "order_replace",
            "order_status",
            "order_clone",
            "order_receipt"
        )
    )]
    pub async fn order(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Order command. Available subcommands:\n\
            `/order new` - Create an order and reserve its stock\n\
            `/order show` - Show one order\n\
            `/order history` - List orders, optionally for one customer\n\
            `/order add_line` / `edit_line` / `remove_line` - Change single lines\n\
            `/order replace` - Replace all lines of an order\n\
            `/order status` - Change an order's status\n\
            `/order clone` - Copy an order as a new quote\n\
            `/order receipt` - Get a PDF or PNG receipt";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Creates a new order and reserves stock for every item.
    #[poise::command(slash_command, rename = "new")]
    pub async fn order_new(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Customer name"] customer: String,
        #[description = "Items as Product=ml, e.g. 'Aventus=30, Layton=10'"] items: String,
        #[description = "Initial status (defaults to Pending)"]
        #[autocomplete = "autocomplete::autocomplete_status"]
        status: Option<String>,
        #[description = "Order date as YYYY-MM-DD (defaults to today)"] date: Option<String>,
    ) -> Result<()> {
        let lines = parse_items(&items)?;
        let status = status
            .as_deref()
            .map(str::parse::<OrderStatus>)
            .transpose()?
            .unwrap_or(OrderStatus::Pending);
        let date = parse_date(date.as_deref())?;
        let db = &ctx.data().database;

        let details = order::create_order(
            db,
            NewOrder {
                customer_name: customer,
                date,
                status,
                lines,
            },
        )
        .await?;

        send_order(ctx, &details, Some("✅ Order created.".to_string())).await
    }

    /// Shows one order with its line ids.
    #[poise::command(slash_command, rename = "show")]
    pub async fn order_show(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Order number"] order_id: i64,
    ) -> Result<()> {
        let details = require_order(&ctx.data().database, order_id).await?;
        send_order(ctx, &details, None).await
    }

    /// Lists orders, newest first.
    #[poise::command(slash_command, rename = "history")]
    pub async fn order_history(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only orders whose customer name contains this text"] customer: Option<
            String,
        >,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let orders = order::list_orders(db, customer.as_deref()).await?;

        if orders.is_empty() {
            ctx.say("No orders found.").await?;
            return Ok(());
        }

        let mut description = String::new();
        for details in &orders {
            writeln!(
                description,
                "**#{}** {} · {} · {} · {} line(s) · {}",
                details.order.id,
                details.order.date.format("%Y-%m-%d"),
                details.order.customer_name,
                details.order.status,
                details.lines.len(),
                crate::core::receipt::format_money(details.total())
            )?;
        }

        let title = customer.map_or_else(
            || "Order history".to_string(),
            |c| format!("Order history for '{c}'"),
        );
        let embed = serenity::CreateEmbed::default()
            .title(title)
            .color(0x0058_65F2)
            .description(truncate_for_embed(&description));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Adds a product to an existing order.
    #[poise::command(slash_command, rename = "add_line")]
    pub async fn order_add_line(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Order number"] order_id: i64,
        #[description = "Product to add"]
        #[autocomplete = "autocomplete::autocomplete_product_name"]
        product: String,
        #[description = "Quantity in ml"] quantity: String,
    ) -> Result<()> {
        let quantity = stock::parse_quantity(&quantity)?;
        let db = &ctx.data().database;

        let change = order::add_line(db, order_id, NewLine::new(product, quantity)).await?;
        let details = require_order(db, order_id).await?;

        let note = format!(
            "✅ Added {} ml of **{}**.{}",
            change.line.quantity.normalize(),
            change.line.product_name,
            change
                .available_after
                .map(|a| format!(" {} ml left in stock.", a.normalize()))
                .unwrap_or_default()
        );
        send_order(ctx, &details, Some(note)).await
    }

    /// Changes the quantity of one order line.
    #[poise::command(slash_command, rename = "edit_line")]
    pub async fn order_edit_line(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Line id, shown as #id by /order show"] line_id: i64,
        #[description = "New quantity in ml (use remove_line to delete)"] quantity: String,
    ) -> Result<()> {
        let quantity = stock::parse_quantity(&quantity)?;
        let db = &ctx.data().database;

        let change = order::edit_line_quantity(db, line_id, quantity).await?;
        let details = require_order(db, change.line.order_id).await?;

        let mut note = format!(
            "✅ **{}** is now {} ml.",
            change.line.product_name,
            change.line.quantity.normalize()
        );
        if let Some(available) = change.available_after {
            write!(note, " {} ml left in stock.", available.normalize())?;
        }
        if let Some(warning) = change.warning {
            write!(note, "\n⚠️ {warning}")?;
        }
        send_order(ctx, &details, Some(note)).await
    }

    /// Removes one line from an order and returns its stock.
    #[poise::command(slash_command, rename = "remove_line")]
    pub async fn order_remove_line(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Line id, shown as #id by /order show"] line_id: i64,
    ) -> Result<()> {
        let db = &ctx.data().database;

        let change = order::delete_line(db, line_id).await?;
        let details = require_order(db, change.line.order_id).await?;

        let mut note = format!(
            "🗑️ Removed {} ml of **{}**.",
            change.line.quantity.normalize(),
            change.line.product_name
        );
        if let Some(warning) = change.warning {
            write!(note, "\n⚠️ {warning}")?;
        }
        send_order(ctx, &details, Some(note)).await
    }

    /// Replaces every line of an order, moving only the net stock difference.
    #[poise::command(slash_command, rename = "replace")]
    pub async fn order_replace(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Order number"] order_id: i64,
        #[description = "New items as Product=ml, e.g. 'Aventus=30, Layton=10'"] items: String,
    ) -> Result<()> {
        let lines = parse_items(&items)?;
        let db = &ctx.data().database;

        let update = order::replace_lines(db, order_id, lines).await?;

        let mut note = "✅ Order updated.".to_string();
        for warning in &update.warnings {
            write!(note, "\n⚠️ {warning}")?;
        }
        send_order(ctx, &update.details, Some(note)).await
    }

    /// Changes the status of an order.
    #[poise::command(slash_command, rename = "status")]
    pub async fn order_status(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Order number"] order_id: i64,
        #[description = "New status"]
        #[autocomplete = "autocomplete::autocomplete_status"]
        status: String,
    ) -> Result<()> {
        let status: OrderStatus = status.parse()?;
        let updated = order::set_status(&ctx.data().database, order_id, status).await?;

        ctx.say(format!(
            "✅ Order #{} is now **{}**.",
            updated.id, updated.status
        ))
        .await?;
        Ok(())
    }

    /// Copies an order as a new quote dated today, at current prices.
    #[poise::command(slash_command, rename = "clone")]
    pub async fn order_clone(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Order number to copy"] order_id: i64,
    ) -> Result<()> {
        let outcome = order::clone_order(&ctx.data().database, order_id, today()).await?;
        let skipped = describe_skipped(&outcome.skipped);

        match outcome.order {
            Some(details) => {
                let mut note = format!("✅ Order #{order_id} cloned.");
                if !skipped.is_empty() {
                    write!(note, "\n{skipped}")?;
                }
                send_order(ctx, &details, Some(note)).await
            }
            None => {
                ctx.say(format!(
                    "❌ Nothing to clone from order #{order_id}; no order was created.\n{skipped}"
                ))
                .await?;
                Ok(())
            }
        }
    }

    /// Sends a receipt for an order as a PDF or PNG attachment.
    #[poise::command(slash_command, rename = "receipt")]
    pub async fn order_receipt(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Order number"] order_id: i64,
        #[description = "pdf or png (defaults to the configured format)"]
        #[autocomplete = "autocomplete::autocomplete_receipt_format"]
        format: Option<String>,
    ) -> Result<()> {
        let settings = &ctx.data().settings;
        let format = format
            .as_deref()
            .map(str::parse::<ReceiptFormat>)
            .transpose()?
            .unwrap_or(settings.default_receipt_format);

        let details = require_order(&ctx.data().database, order_id).await?;
        let receipt = Receipt::from_order(settings.business_name.clone(), &details);
        let rendered = receipt.render(format, settings.logo_path.as_deref())?;

        let attachment = serenity::CreateAttachment::bytes(rendered.bytes, rendered.filename);
        ctx.send(
            poise::CreateReply::default()
                .content(format!("🧾 Receipt for order #{order_id}"))
                .attachment(attachment),
        )
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
