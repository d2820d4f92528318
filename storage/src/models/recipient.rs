//! Recipient model for persistence.
//!
//! Maps to the `recipients` table; created on first contact with the bot and
//! never mutated afterwards.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recipient {
    /// Internal id (autoincrement primary key; 0 before the first save).
    pub recipient_id: i64,
    pub display_name: String,
    /// Telegram username, unique across recipients.
    pub tg_username: String,
    /// Telegram numeric user id, unique across recipients.
    pub tg_user_id: i64,
}

impl Recipient {
    /// Creates a new, not-yet-persisted recipient.
    pub fn new(display_name: String, tg_username: String, tg_user_id: i64) -> Self {
        Self {
            recipient_id: 0,
            display_name,
            tg_username,
            tg_user_id,
        }
    }
}
