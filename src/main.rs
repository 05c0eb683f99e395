use decant_desk::{
    bot::{self, BotData},
    config::{database, settings},
    core::product,
    errors::{Error, Result},
};
use dotenvy::dotenv;
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load config.toml (or defaults)
    let settings = settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {e}"))?;
    info!(business = %settings.business_name, "Settings loaded.");

    // 4. Initialize database
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;

    // 5. Seed the catalog from config
    product::seed_products(&db, &settings.products)
        .await
        .inspect_err(|e| error!("Failed to seed products: {e}"))?;

    // 6. Run the bot
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {e}"))
        .map_err(Error::EnvVar)?;

    bot::run_bot(&token, BotData::new(db, settings)).await
}
