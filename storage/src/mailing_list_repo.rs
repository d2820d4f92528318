//! Mailing list repository: list creation with membership and membership
//! queries.

use crate::models::{MailingList, Recipient};
use crate::sqlite_pool::SqlitePoolManager;
use crate::StorageError;
use tracing::info;

#[derive(Clone)]
pub struct MailingListRepository {
    pool_manager: SqlitePoolManager,
}

impl MailingListRepository {
    pub fn new(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    pub(crate) async fn init(&self) -> Result<(), sqlx::Error> {
        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS mailing_lists (
                list_id INTEGER PRIMARY KEY AUTOINCREMENT,
                sender_tg_id INTEGER NOT NULL,
                list_name TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS mailing_list_members (
                list_id INTEGER NOT NULL,
                recipient_id INTEGER NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_list_members_list_id ON mailing_list_members(list_id)",
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Inserts a list plus one membership row per recipient id; returns the
    /// list id. Membership is fixed at creation.
    pub async fn add(
        &self,
        list: &MailingList,
        recipient_ids: &[i64],
    ) -> Result<i64, StorageError> {
        let pool = self.pool_manager.pool();

        let result = sqlx::query(
            r#"
            INSERT INTO mailing_lists (sender_tg_id, list_name)
            VALUES (?, ?)
            "#,
        )
        .bind(list.sender_tg_id)
        .bind(&list.list_name)
        .execute(pool)
        .await?;
        let list_id = result.last_insert_rowid();

        for recipient_id in recipient_ids {
            sqlx::query(
                r#"
                INSERT INTO mailing_list_members (list_id, recipient_id)
                VALUES (?, ?)
                "#,
            )
            .bind(list_id)
            .bind(recipient_id)
            .execute(pool)
            .await?;
        }

        info!(
            list_id,
            list_name = %list.list_name,
            members = recipient_ids.len(),
            "Created mailing list"
        );
        Ok(list_id)
    }

    /// Returns the recipients subscribed to the given list.
    pub async fn members(&self, list_id: i64) -> Result<Vec<Recipient>, StorageError> {
        let pool = self.pool_manager.pool();

        let recipients = sqlx::query_as::<_, Recipient>(
            r#"
            SELECT r.recipient_id, r.display_name, r.tg_username, r.tg_user_id
            FROM recipients r
            JOIN mailing_list_members m ON m.recipient_id = r.recipient_id
            WHERE m.list_id = ?
            ORDER BY r.recipient_id
            "#,
        )
        .bind(list_id)
        .fetch_all(pool)
        .await?;

        Ok(recipients)
    }
}
