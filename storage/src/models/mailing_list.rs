//! Mailing list model for persistence.
//!
//! Maps to the `mailing_lists` table; membership lives in the
//! `mailing_list_members` join table and is fixed at creation time.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MailingList {
    /// Internal id (autoincrement primary key; 0 before the first save).
    pub list_id: i64,
    /// Telegram id of the sender who owns this list.
    pub sender_tg_id: i64,
    pub list_name: String,
}

impl MailingList {
    /// Creates a new, not-yet-persisted mailing list.
    pub fn new(sender_tg_id: i64, list_name: String) -> Self {
        Self {
            list_id: 0,
            sender_tg_id,
            list_name,
        }
    }
}
