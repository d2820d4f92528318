//! Topic repository: implicit creation on first broadcast and lookups by
//! owner, id, or (name, owner).
//!
//! Duplicate (name, owner) rows are tolerated; name lookups resolve to the
//! newest topic_id.

use crate::models::Topic;
use crate::sqlite_pool::SqlitePoolManager;
use crate::StorageError;
use tracing::info;

#[derive(Clone)]
pub struct TopicRepository {
    pool_manager: SqlitePoolManager,
}

impl TopicRepository {
    pub fn new(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    pub(crate) async fn init(&self) -> Result<(), sqlx::Error> {
        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS topics (
                topic_id INTEGER PRIMARY KEY AUTOINCREMENT,
                sender_tg_id INTEGER NOT NULL,
                topic_name TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_topics_sender ON topics(sender_tg_id, topic_name)",
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Returns the sender's topic with the given name, creating it when no
    /// such topic exists yet.
    pub async fn get_or_create(
        &self,
        sender_tg_id: i64,
        topic_name: &str,
    ) -> Result<Topic, StorageError> {
        match self.get_by_name_and_sender(topic_name, sender_tg_id).await {
            Ok(topic) => Ok(topic),
            Err(StorageError::NotFound(_)) => {
                let pool = self.pool_manager.pool();
                let result = sqlx::query(
                    r#"
                    INSERT INTO topics (sender_tg_id, topic_name)
                    VALUES (?, ?)
                    "#,
                )
                .bind(sender_tg_id)
                .bind(topic_name)
                .execute(pool)
                .await?;

                info!(sender_tg_id, topic_name, "Created topic");
                Ok(Topic {
                    topic_id: result.last_insert_rowid(),
                    sender_tg_id,
                    topic_name: topic_name.to_string(),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Looks up a topic by name and owning sender; newest match wins.
    pub async fn get_by_name_and_sender(
        &self,
        topic_name: &str,
        sender_tg_id: i64,
    ) -> Result<Topic, StorageError> {
        let pool = self.pool_manager.pool();

        sqlx::query_as::<_, Topic>(
            r#"
            SELECT * FROM topics
            WHERE topic_name = ? AND sender_tg_id = ?
            ORDER BY topic_id DESC
            LIMIT 1
            "#,
        )
        .bind(topic_name)
        .bind(sender_tg_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StorageError::NotFound(format!("topic '{}'", topic_name)))
    }

    /// Looks up a topic by internal id.
    pub async fn get_by_id(&self, topic_id: i64) -> Result<Topic, StorageError> {
        let pool = self.pool_manager.pool();

        sqlx::query_as::<_, Topic>("SELECT * FROM topics WHERE topic_id = ?")
            .bind(topic_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("topic {}", topic_id)))
    }

    /// Lists all topics owned by the given sender.
    pub async fn list_by_sender(&self, sender_tg_id: i64) -> Result<Vec<Topic>, StorageError> {
        let pool = self.pool_manager.pool();

        let topics = sqlx::query_as::<_, Topic>(
            "SELECT * FROM topics WHERE sender_tg_id = ? ORDER BY topic_name",
        )
        .bind(sender_tg_id)
        .fetch_all(pool)
        .await?;

        Ok(topics)
    }
}
