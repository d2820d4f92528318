//! Bot config: Telegram connection, admin allow-list, paging, logging,
//! database. Loaded from env.

use anyhow::Result;
use std::env;

use crate::pagination::DEFAULT_PAGE_SIZE;

/// Runtime configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// BOT_TOKEN
    pub bot_token: String,
    /// DATABASE_URL (SQLite)
    pub database_url: String,
    /// LOG_FILE path
    pub log_file: String,
    /// ADMIN_IDS: comma-separated Telegram user ids allowed to run sender
    /// commands. Empty means no restriction.
    pub admin_ids: Vec<i64>,
    /// PAGE_SIZE: replies per page in the browsing view.
    pub page_size: usize,
}

impl BotConfig {
    /// Load from environment variables. `token` overrides BOT_TOKEN if provided.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(token) => token,
            None => env::var("BOT_TOKEN").map_err(|_| anyhow::anyhow!("BOT_TOKEN not set"))?,
        };
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:relay-bot.db".to_string());
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| "logs/relay-bot.log".to_string());
        let admin_ids = env::var("ADMIN_IDS")
            .map(|raw| parse_admin_ids(&raw))
            .unwrap_or_default();
        let page_size = env::var("PAGE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE);

        Ok(Self {
            bot_token,
            database_url,
            log_file,
            admin_ids,
            page_size,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.bot_token.is_empty() {
            anyhow::bail!("BOT_TOKEN must not be empty");
        }
        if self.page_size == 0 {
            anyhow::bail!("PAGE_SIZE must be at least 1");
        }
        Ok(())
    }

    /// True when the user may run sender commands. An empty allow-list
    /// disables the restriction.
    pub fn is_admin(&self, tg_user_id: i64) -> bool {
        self.admin_ids.is_empty() || self.admin_ids.contains(&tg_user_id)
    }
}

fn parse_admin_ids(raw: &str) -> Vec<i64> {
    raw.split(',')
        .filter_map(|part| part.trim().parse().ok())
        .collect()
}
