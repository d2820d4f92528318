//! Aggregate per-topic message statistics.
//!
//! Returned by MessageRepository::topic_stats.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicStats {
    /// Sender-authored legs (direction = FromSender).
    pub sent: i64,
    /// Recipient-authored legs (direction = FromRecipient).
    pub received: i64,
}
