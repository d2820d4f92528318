//! Thread message model for persistence.
//!
//! One row per conversation leg: either a sender broadcast delivered to a
//! recipient, or a recipient reply relayed back to the sender. All rows
//! sharing a `(topic_id, list_id)` pair form one thread.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel `tg_message_id` for legs that were persisted but never delivered
/// (e.g. the sender has notifications disabled).
pub const UNDELIVERED_TG_MESSAGE_ID: i64 = 0;

/// Which party authored the leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i32)]
pub enum Direction {
    /// Sender-authored, flows sender -> recipient.
    FromSender = 0,
    /// Recipient-authored, flows recipient -> sender.
    FromRecipient = 1,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MessageRecord {
    /// Internal id (autoincrement primary key; 0 before the first save).
    pub message_id: i64,
    /// Transport-assigned message id, or [`UNDELIVERED_TG_MESSAGE_ID`].
    pub tg_message_id: i64,
    /// Telegram id of the sender side of the thread.
    pub sender_tg_id: i64,
    /// Internal id of the recipient side of the thread.
    pub recipient_id: i64,
    pub topic_id: i64,
    /// Mailing list the thread belongs to; 0 marks a standalone post that is
    /// not part of any thread.
    pub list_id: i64,
    pub sent_at: DateTime<Utc>,
    pub body: String,
    /// Free-form reaction annotation; empty until a reaction feature uses it.
    pub reaction: String,
    pub read_flag: bool,
    pub direction: Direction,
}

impl MessageRecord {
    /// Creates a new, not-yet-persisted record with empty reaction and unread
    /// flag.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tg_message_id: i64,
        sender_tg_id: i64,
        recipient_id: i64,
        topic_id: i64,
        list_id: i64,
        sent_at: DateTime<Utc>,
        body: String,
        direction: Direction,
    ) -> Self {
        Self {
            message_id: 0,
            tg_message_id,
            sender_tg_id,
            recipient_id,
            topic_id,
            list_id,
            sent_at,
            body,
            reaction: String::new(),
            read_flag: false,
            direction,
        }
    }

    /// True when this leg was persisted without being delivered.
    pub fn is_undelivered(&self) -> bool {
        self.tg_message_id == UNDELIVERED_TG_MESSAGE_ID
    }
}
