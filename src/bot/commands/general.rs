//! General Discord commands - ping, help, and other utility commands.
//! This module contains simple commands that don't require database operations
//! and provide basic bot functionality and user assistance.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    ///
    /// This is a simple health check command that doesn't require any database operations.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = format!(
            "**{} Help**\n\
            Orders reserve stock as soon as they are created; editing or removing lines \
            moves the difference back into the catalog.\n\n\
            **Orders**\n\
            • `/order new <customer> <items> [status] [date]` - Items as `Aventus=30, Layton=10`.\n\
            • `/order show <order_id>` - Shows an order with its line ids.\n\
            • `/order history [customer]` - Lists orders, newest first.\n\
            • `/order add_line`, `/order edit_line`, `/order remove_line` - Change single lines.\n\
            • `/order replace <order_id> <items>` - Replaces every line of an order.\n\
            • `/order status <order_id> <status>` - Quote, Pending, Paid, In Progress, Delivered.\n\
            • `/order clone <order_id>` - Copies an order as a new quote, skipping short stock.\n\
            • `/order receipt <order_id> [format]` - Sends a PDF or PNG receipt.\n\n\
            **Catalog and stock**\n\
            • `/catalog add|list|price` - Manage products and prices.\n\
            • `/purchase record|list` - Record inbound stock.\n\
            • `/ship <order_id> ...` - Record the shipping address of an order.\n\n\
            **Utility Commands**\n\
            • `/ping` - Checks if the bot is responsive.\n\
            • `/help` - Shows this help message.",
            ctx.data().settings.business_name
        );

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
