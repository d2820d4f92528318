//! Notification settings repository.
//!
//! One row per sender; an absent row means notifications are enabled.

use crate::sqlite_pool::SqlitePoolManager;
use crate::StorageError;
use tracing::info;

#[derive(Clone)]
pub struct NotificationSettingsRepository {
    pool_manager: SqlitePoolManager,
}

impl NotificationSettingsRepository {
    pub fn new(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    pub(crate) async fn init(&self) -> Result<(), sqlx::Error> {
        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS notification_settings (
                sender_tg_id INTEGER PRIMARY KEY,
                enabled INTEGER NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Sets whether reply notifications are delivered to the given sender.
    pub async fn set_enabled(&self, sender_tg_id: i64, enabled: bool) -> Result<(), StorageError> {
        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            INSERT INTO notification_settings (sender_tg_id, enabled)
            VALUES (?, ?)
            ON CONFLICT (sender_tg_id) DO UPDATE SET enabled = excluded.enabled
            "#,
        )
        .bind(sender_tg_id)
        .bind(enabled)
        .execute(pool)
        .await?;

        info!(sender_tg_id, enabled, "Updated notification setting");
        Ok(())
    }

    /// Returns the sender's notification setting; defaults to enabled.
    pub async fn is_enabled(&self, sender_tg_id: i64) -> Result<bool, StorageError> {
        let pool = self.pool_manager.pool();

        let row: Option<(bool,)> =
            sqlx::query_as("SELECT enabled FROM notification_settings WHERE sender_tg_id = ?")
                .bind(sender_tg_id)
                .fetch_optional(pool)
                .await?;

        Ok(row.map(|(enabled,)| enabled).unwrap_or(true))
    }
}
