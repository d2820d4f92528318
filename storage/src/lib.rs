//! Storage crate: persistence for recipients, mailing lists, topics and
//! thread messages.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`models`] – Recipient, MailingList, Topic, MessageRecord, TopicStats
//! - [`recipient_repo`] – RecipientRepository (SQLite)
//! - [`mailing_list_repo`] – MailingListRepository (SQLite)
//! - [`topic_repo`] – TopicRepository (SQLite)
//! - [`message_repo`] – MessageRepository (SQLite)
//! - [`settings_repo`] – NotificationSettingsRepository (SQLite)
//! - [`database`] – Database aggregate over one pool
//! - [`sqlite_pool`] – SqlitePoolManager

mod database;
mod error;
mod mailing_list_repo;
mod message_repo;
mod models;
mod recipient_repo;
mod settings_repo;
mod sqlite_pool;
mod topic_repo;

#[cfg(test)]
mod database_test;
#[cfg(test)]
mod mailing_list_repo_test;
#[cfg(test)]
mod topic_repo_test;

pub use database::Database;
pub use error::StorageError;
pub use mailing_list_repo::MailingListRepository;
pub use message_repo::MessageRepository;
pub use models::{
    Direction, MailingList, MessageRecord, Recipient, Topic, TopicStats, UNDELIVERED_TG_MESSAGE_ID,
};
pub use recipient_repo::RecipientRepository;
pub use settings_repo::NotificationSettingsRepository;
pub use sqlite_pool::SqlitePoolManager;
pub use topic_repo::TopicRepository;
