use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lunchbox::bot::{self, AppState, Command};
use lunchbox::config::BotConfig;
use lunchbox::store::{postgres::init_database_schema, PgStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Lunchbox Telegram Bot");

    let config = BotConfig::from_env().context("Failed to load configuration")?;

    info!(max_connections = config.max_connections, "Connecting to database");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    // Initialize database schema
    init_database_schema(&pool).await?;

    let bot = Bot::new(config.bot_token.clone());
    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!(error = %e, "Failed to register bot commands");
    }

    let state = Arc::new(AppState::new(Arc::new(PgStore::new(pool)), config));

    info!("Bot initialized, starting dispatcher");

    Dispatcher::builder(bot, bot::schema::<PgStore>())
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
