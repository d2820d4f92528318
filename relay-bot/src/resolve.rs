//! Thread resolution: correlates an inbound reply with the outbound message
//! it answers.
//!
//! The reply index is consulted first (replies to rendered paging slots),
//! then persistence by transport message id. A miss is an expected event,
//! e.g. a reply to a message the bot never sent, and surfaces as `NotFound`
//! so the caller can drop the reply silently.

use storage::{Database, MessageRecord};
use tracing::debug;

use crate::core::{BotError, Result};
use crate::session::ReplyIndex;

#[derive(Clone)]
pub struct ThreadResolver {
    reply_index: ReplyIndex,
    db: Database,
}

impl ThreadResolver {
    pub fn new(reply_index: ReplyIndex, db: Database) -> Self {
        Self { reply_index, db }
    }

    /// Resolves the thread message a reply targets, by transport message id.
    /// A resolved row with `list_id = 0` is a standalone post outside any
    /// thread; it is treated as a miss so the reply is never relayed.
    pub async fn resolve(&self, reply_to_tg_id: i64) -> Result<MessageRecord> {
        if let Some(message) = self.reply_index.lookup(reply_to_tg_id).await {
            debug!(reply_to_tg_id, "Resolved reply target from reply index");
            return Self::require_thread(message);
        }

        match self.db.messages.get_by_tg_message_id(reply_to_tg_id).await? {
            Some(message) => {
                debug!(reply_to_tg_id, "Resolved reply target from storage");
                Self::require_thread(message)
            }
            None => Err(BotError::NotFound(format!(
                "no thread message for transport id {}",
                reply_to_tg_id
            ))),
        }
    }

    fn require_thread(message: MessageRecord) -> Result<MessageRecord> {
        if message.list_id == 0 {
            return Err(BotError::NotFound(format!(
                "message {} is not part of a thread",
                message.message_id
            )));
        }
        Ok(message)
    }
}
