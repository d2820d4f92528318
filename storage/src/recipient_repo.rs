//! Recipient repository: registration and lookups by internal id, Telegram id
//! or Telegram username.

use crate::models::Recipient;
use crate::sqlite_pool::SqlitePoolManager;
use crate::StorageError;
use tracing::info;

#[derive(Clone)]
pub struct RecipientRepository {
    pool_manager: SqlitePoolManager,
}

/// Builds a `?, ?, ...` placeholder list for an `IN (...)` clause.
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

impl RecipientRepository {
    pub fn new(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    pub(crate) async fn init(&self) -> Result<(), sqlx::Error> {
        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS recipients (
                recipient_id INTEGER PRIMARY KEY AUTOINCREMENT,
                display_name TEXT NOT NULL,
                tg_username TEXT NOT NULL UNIQUE,
                tg_user_id INTEGER NOT NULL UNIQUE
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Inserts a recipient and returns its internal id.
    pub async fn add(&self, recipient: &Recipient) -> Result<i64, StorageError> {
        let pool = self.pool_manager.pool();

        let result = sqlx::query(
            r#"
            INSERT INTO recipients (display_name, tg_username, tg_user_id)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&recipient.display_name)
        .bind(&recipient.tg_username)
        .bind(recipient.tg_user_id)
        .execute(pool)
        .await?;

        info!(
            tg_user_id = recipient.tg_user_id,
            tg_username = %recipient.tg_username,
            "Registered recipient"
        );
        Ok(result.last_insert_rowid())
    }

    /// Looks up recipients by Telegram user id.
    pub async fn get_by_tg_ids(&self, tg_ids: &[i64]) -> Result<Vec<Recipient>, StorageError> {
        if tg_ids.is_empty() {
            return Ok(Vec::new());
        }
        let pool = self.pool_manager.pool();

        let sql = format!(
            "SELECT * FROM recipients WHERE tg_user_id IN ({})",
            placeholders(tg_ids.len())
        );
        let mut query = sqlx::query_as::<_, Recipient>(&sql);
        for id in tg_ids {
            query = query.bind(id);
        }

        Ok(query.fetch_all(pool).await?)
    }

    /// Looks up recipients by Telegram username (without the `@` prefix).
    pub async fn get_by_usernames(
        &self,
        usernames: &[String],
    ) -> Result<Vec<Recipient>, StorageError> {
        if usernames.is_empty() {
            return Ok(Vec::new());
        }
        let pool = self.pool_manager.pool();

        let sql = format!(
            "SELECT * FROM recipients WHERE tg_username IN ({})",
            placeholders(usernames.len())
        );
        let mut query = sqlx::query_as::<_, Recipient>(&sql);
        for name in usernames {
            query = query.bind(name);
        }

        Ok(query.fetch_all(pool).await?)
    }

    /// Looks up a single recipient by internal id.
    pub async fn get_by_id(&self, recipient_id: i64) -> Result<Recipient, StorageError> {
        let pool = self.pool_manager.pool();

        sqlx::query_as::<_, Recipient>("SELECT * FROM recipients WHERE recipient_id = ?")
            .bind(recipient_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("recipient {}", recipient_id)))
    }
}
