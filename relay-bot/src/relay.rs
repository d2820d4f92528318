//! Relay dispatcher: the send-and-persist leg of threading.
//!
//! Once thread resolution decided which prior message a reply answers, the
//! dispatcher forwards the body to the counterparty and persists the new leg
//! with topic and list carried over from the source message. Send happens
//! before persist, so a failed send never creates an orphan row; the inverse
//! gap (delivered but not recorded) is accepted.

use std::sync::Arc;

use chrono::Utc;
use storage::{Database, Direction, MessageRecord, UNDELIVERED_TG_MESSAGE_ID};
use tracing::{info, instrument};

use crate::core::{BotError, Result, Transport};

#[derive(Clone)]
pub struct RelayDispatcher {
    transport: Arc<dyn Transport>,
    db: Database,
}

impl RelayDispatcher {
    pub fn new(transport: Arc<dyn Transport>, db: Database) -> Self {
        Self { transport, db }
    }

    /// Relays a reply to the counterparty of `source` and persists the new
    /// leg. The parties of the new leg come from `source`, not from the
    /// reply event: the bot relays on behalf of the original sender and
    /// recipient.
    #[instrument(skip(self, source, body), fields(topic_id = source.topic_id))]
    pub async fn relay_reply(&self, source: &MessageRecord, body: &str) -> Result<()> {
        match source.direction {
            // The resolved leg came from the recipient, so the replier is
            // the sender: forward to the original recipient.
            Direction::FromRecipient => {
                let recipient = self.db.recipients.get_by_id(source.recipient_id).await?;
                let sent = self.transport.send_text(recipient.tg_user_id, body).await?;

                let record = MessageRecord::new(
                    sent.message_id,
                    source.sender_tg_id,
                    source.recipient_id,
                    source.topic_id,
                    source.list_id,
                    sent.sent_at,
                    body.to_string(),
                    Direction::FromSender,
                );
                self.db.messages.save(&record).await?;

                info!(
                    recipient_id = source.recipient_id,
                    "Relayed sender reply to recipient"
                );
            }
            // The resolved leg came from the sender, so the replier is the
            // recipient: forward to the owning sender unless notifications
            // are off. The leg is persisted either way; an undelivered one
            // carries the sentinel transport id.
            Direction::FromSender => {
                let notify = self.db.settings.is_enabled(source.sender_tg_id).await?;

                let (tg_message_id, sent_at) = if notify {
                    let sent = self
                        .transport
                        .send_text(source.sender_tg_id, body)
                        .await?;
                    (sent.message_id, sent.sent_at)
                } else {
                    (UNDELIVERED_TG_MESSAGE_ID, Utc::now())
                };

                let record = MessageRecord::new(
                    tg_message_id,
                    source.sender_tg_id,
                    source.recipient_id,
                    source.topic_id,
                    source.list_id,
                    sent_at,
                    body.to_string(),
                    Direction::FromRecipient,
                );
                self.db.messages.save(&record).await?;

                info!(
                    sender_tg_id = source.sender_tg_id,
                    delivered = notify,
                    "Relayed recipient reply to sender"
                );
            }
        }

        Ok(())
    }

    /// Sends a broadcast to every member of the mailing list under the given
    /// topic (created on first use) and persists one sender-authored leg per
    /// delivery. Returns the number of delivered messages. The first
    /// transport or storage failure aborts the remaining sends.
    #[instrument(skip(self, body))]
    pub async fn broadcast(
        &self,
        sender_tg_id: i64,
        topic_name: &str,
        list_id: i64,
        body: &str,
    ) -> Result<usize> {
        let topic = self.db.topics.get_or_create(sender_tg_id, topic_name).await?;
        let members = self.db.lists.members(list_id).await?;
        if members.is_empty() {
            return Err(BotError::NotFound(format!("mailing list {}", list_id)));
        }

        for member in &members {
            let sent = self.transport.send_text(member.tg_user_id, body).await?;

            let record = MessageRecord::new(
                sent.message_id,
                sender_tg_id,
                member.recipient_id,
                topic.topic_id,
                list_id,
                sent.sent_at,
                body.to_string(),
                Direction::FromSender,
            );
            self.db.messages.save(&record).await?;
        }

        info!(
            topic_id = topic.topic_id,
            list_id,
            delivered = members.len(),
            "Broadcast sent"
        );
        Ok(members.len())
    }
}
