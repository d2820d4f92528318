//! Database aggregate: all repositories over one shared SQLite pool.

use crate::mailing_list_repo::MailingListRepository;
use crate::message_repo::MessageRepository;
use crate::recipient_repo::RecipientRepository;
use crate::settings_repo::NotificationSettingsRepository;
use crate::sqlite_pool::SqlitePoolManager;
use crate::topic_repo::TopicRepository;
use tracing::info;

/// One handle over every repository; cheap to clone.
#[derive(Clone)]
pub struct Database {
    pub recipients: RecipientRepository,
    pub lists: MailingListRepository,
    pub topics: TopicRepository,
    pub messages: MessageRepository,
    pub settings: NotificationSettingsRepository,
}

impl Database {
    /// Connects to the given database URL and creates all tables if missing.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;

        let db = Self {
            recipients: RecipientRepository::new(pool_manager.clone()),
            lists: MailingListRepository::new(pool_manager.clone()),
            topics: TopicRepository::new(pool_manager.clone()),
            messages: MessageRepository::new(pool_manager.clone()),
            settings: NotificationSettingsRepository::new(pool_manager),
        };

        db.recipients.init().await?;
        db.lists.init().await?;
        db.topics.init().await?;
        db.messages.init().await?;
        db.settings.init().await?;

        info!(database_url, "Database schema ready");
        Ok(db)
    }
}
