//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for `DecantDesk`, including all slash
//! commands, autocomplete handlers, and bot context management.

/// Discord command implementations (catalog, order, purchase, shipment, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{config::settings::Settings, errors::Error};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use tracing::{error, info, instrument, warn};

/// Shared data available to all bot commands.
/// This structure holds the database connection and the loaded settings.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Business name, logo and receipt defaults
    pub settings: Settings,
}

impl BotData {
    /// Creates a new `BotData` instance with the given database connection and settings.
    #[must_use]
    pub const fn new(database: DatabaseConnection, settings: Settings) -> Self {
        Self { database, settings }
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            let command = &ctx.command().name;
            if error.is_user_error() {
                warn!("Command `{command}` rejected: {error}");
            } else {
                error!("Error in command `{command}`: {error:?}");
            }
            if let Err(e) = ctx.say(format!("❌ {error}")).await {
                error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// All slash commands registered by the bot.
#[must_use]
pub fn all_commands() -> Vec<poise::Command<BotData, Error>> {
    vec![
        commands::ping(),
        commands::help(),
        commands::catalog(),
        commands::order(),
        commands::purchase(),
        commands::ship(),
    ]
}

/// Connects to Discord and runs the bot until the client stops.
///
/// # Errors
/// Returns [`Error::Discord`] if the client cannot be created or the connection fails.
#[instrument(skip_all)]
pub async fn run_bot(token: &str, data: BotData) -> Result<(), Error> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: all_commands(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {e:?}"))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {e:?}"))?;
    Ok(())
}

pub use commands::*;
pub use handlers::*;
