//! Message repository: persistence and queries for thread messages.
//!
//! Uses SqlitePoolManager and the MessageRecord model. Callers are the relay
//! dispatcher (insert), thread resolution (lookup by transport id) and the
//! pagination engine (recipient replies by topic).

use crate::models::{Direction, MessageRecord, TopicStats, UNDELIVERED_TG_MESSAGE_ID};
use crate::sqlite_pool::SqlitePoolManager;
use crate::StorageError;
use tracing::info;

#[derive(Clone)]
pub struct MessageRepository {
    pool_manager: SqlitePoolManager,
}

impl MessageRepository {
    pub fn new(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    pub(crate) async fn init(&self) -> Result<(), sqlx::Error> {
        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                message_id INTEGER PRIMARY KEY AUTOINCREMENT,
                tg_message_id INTEGER NOT NULL,
                sender_tg_id INTEGER NOT NULL,
                recipient_id INTEGER NOT NULL,
                topic_id INTEGER NOT NULL,
                list_id INTEGER NOT NULL,
                sent_at TEXT NOT NULL,
                body TEXT NOT NULL,
                reaction TEXT NOT NULL,
                read_flag INTEGER NOT NULL,
                direction INTEGER NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_messages_topic_id ON messages(topic_id)")
            .execute(pool)
            .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_messages_tg_message_id ON messages(tg_message_id)",
        )
        .execute(pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_messages_direction ON messages(direction)")
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Inserts a message leg and returns its internal id.
    pub async fn save(&self, message: &MessageRecord) -> Result<i64, StorageError> {
        let pool = self.pool_manager.pool();

        let result = sqlx::query(
            r#"
            INSERT INTO messages (tg_message_id, sender_tg_id, recipient_id, topic_id, list_id, sent_at, body, reaction, read_flag, direction)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(message.tg_message_id)
        .bind(message.sender_tg_id)
        .bind(message.recipient_id)
        .bind(message.topic_id)
        .bind(message.list_id)
        .bind(message.sent_at)
        .bind(&message.body)
        .bind(&message.reaction)
        .bind(message.read_flag)
        .bind(message.direction)
        .execute(pool)
        .await?;

        info!(
            tg_message_id = message.tg_message_id,
            topic_id = message.topic_id,
            direction = ?message.direction,
            "Saved message"
        );
        Ok(result.last_insert_rowid())
    }

    /// Returns all legs of the given topic in send order.
    pub async fn get_by_topic(&self, topic_id: i64) -> Result<Vec<MessageRecord>, StorageError> {
        let pool = self.pool_manager.pool();

        let messages = sqlx::query_as::<_, MessageRecord>(
            "SELECT * FROM messages WHERE topic_id = ? ORDER BY sent_at, message_id",
        )
        .bind(topic_id)
        .fetch_all(pool)
        .await?;

        Ok(messages)
    }

    /// Returns only recipient-authored legs of the given topic, in send order.
    /// This is the reply set the paginated view renders.
    pub async fn get_replies_by_topic(
        &self,
        topic_id: i64,
    ) -> Result<Vec<MessageRecord>, StorageError> {
        let pool = self.pool_manager.pool();

        let messages = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT * FROM messages
            WHERE topic_id = ? AND direction = ?
            ORDER BY sent_at, message_id
            "#,
        )
        .bind(topic_id)
        .bind(Direction::FromRecipient)
        .fetch_all(pool)
        .await?;

        info!(
            topic_id,
            count = messages.len(),
            "Retrieved recipient replies"
        );
        Ok(messages)
    }

    /// Looks up a leg by its transport message id; newest match wins.
    /// The undelivered sentinel never resolves.
    pub async fn get_by_tg_message_id(
        &self,
        tg_message_id: i64,
    ) -> Result<Option<MessageRecord>, StorageError> {
        if tg_message_id == UNDELIVERED_TG_MESSAGE_ID {
            return Ok(None);
        }
        let pool = self.pool_manager.pool();

        let message = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT * FROM messages
            WHERE tg_message_id = ?
            ORDER BY message_id DESC
            LIMIT 1
            "#,
        )
        .bind(tg_message_id)
        .fetch_optional(pool)
        .await?;

        Ok(message)
    }

    /// Counts sent and received legs for a topic.
    pub async fn topic_stats(&self, topic_id: i64) -> Result<TopicStats, StorageError> {
        let pool = self.pool_manager.pool();

        let sent: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM messages WHERE topic_id = ? AND direction = ?")
                .bind(topic_id)
                .bind(Direction::FromSender)
                .fetch_one(pool)
                .await?;

        let received: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM messages WHERE topic_id = ? AND direction = ?")
                .bind(topic_id)
                .bind(Direction::FromRecipient)
                .fetch_one(pool)
                .await?;

        Ok(TopicStats {
            sent: sent.0,
            received: received.0,
        })
    }
}
