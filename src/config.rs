//! # Configuration Module
//!
//! Runtime settings read from the environment (optionally seeded from a
//! `.env` file by the binary).

use std::collections::HashSet;
use std::env;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Duration;
use tracing::info;

pub const DEFAULT_MENU_SESSION_TTL_SECS: u32 = 600;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Settings shared by every handler
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub bot_token: String,
    pub database_url: String,
    pub admin_ids: HashSet<u64>,
    pub menu_session_ttl: Duration,
    pub max_connections: u32,
}

impl BotConfig {
    /// Load the configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load the configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = lookup("TELEGRAM_BOT_TOKEN")
            .or_else(|| lookup("BOT_TOKEN"))
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;

        let database_url = match lookup("DATABASE_URL") {
            Some(url) if !url.trim().is_empty() => url,
            _ => compose_database_url(&lookup),
        };

        let admin_ids = parse_admin_ids(&lookup("ADMIN_IDS").unwrap_or_default())?;
        if admin_ids.is_empty() {
            info!("ADMIN_IDS is empty, menu uploads and reports are disabled");
        }

        Ok(Self {
            bot_token,
            database_url,
            admin_ids,
            menu_session_ttl: parse_session_ttl(&lookup)?,
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
        })
    }

    pub fn is_admin(&self, user_id: u64) -> bool {
        self.admin_ids.contains(&user_id)
    }
}

/// Menu-entry session lifetime: a positive whole number of seconds
fn parse_session_ttl<F>(lookup: &F) -> Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let secs: u32 = parse_or(lookup, "MENU_SESSION_TTL_SECS", DEFAULT_MENU_SESSION_TTL_SECS)?;
    if secs == 0 {
        bail!("MENU_SESSION_TTL_SECS must be greater than zero");
    }
    Duration::try_seconds(i64::from(secs))
        .with_context(|| format!("MENU_SESSION_TTL_SECS out of range: {secs}"))
}

/// Build a PostgreSQL URL from the `DB_*` variables
fn compose_database_url<F>(lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
    format!(
        "postgresql://{}:{}@{}:{}/{}",
        get("DB_USER", "postgres"),
        get("DB_PASSWORD", ""),
        get("DB_HOST", "localhost"),
        get("DB_PORT", "5432"),
        get("DB_NAME", "orders_db"),
    )
}

/// Parse a comma-separated admin id list; blank entries are skipped
pub fn parse_admin_ids(raw: &str) -> Result<HashSet<u64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse::<u64>()
                .with_context(|| format!("Invalid admin id in ADMIN_IDS: {id:?}"))
        })
        .collect()
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {key}: {raw:?}")),
        _ => Ok(default),
    }
}
