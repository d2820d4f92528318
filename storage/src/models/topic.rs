//! Topic model for persistence.
//!
//! A topic is a sender-owned broadcast subject, created implicitly the first
//! time the sender broadcasts under its name. `(topic_name, sender_tg_id)` is
//! the lookup key; the table tolerates duplicates if creation races, so
//! lookups resolve to the most recently created match.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Topic {
    /// Internal id (autoincrement primary key; 0 before the first save).
    pub topic_id: i64,
    /// Telegram id of the sender who owns this topic.
    pub sender_tg_id: i64,
    pub topic_name: String,
}

impl Topic {
    /// Creates a new, not-yet-persisted topic.
    pub fn new(sender_tg_id: i64, topic_name: String) -> Self {
        Self {
            topic_id: 0,
            sender_tg_id,
            topic_name,
        }
    }
}
