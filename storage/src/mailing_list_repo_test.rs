//! Unit tests for MailingListRepository and NotificationSettingsRepository.

use crate::database::Database;
use crate::models::{MailingList, Recipient};

async fn setup() -> Database {
    Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create database")
}

async fn register(db: &Database, name: &str, tg_id: i64) -> i64 {
    db.recipients
        .add(&Recipient::new(name.to_string(), name.to_string(), tg_id))
        .await
        .expect("Failed to add recipient")
}

#[tokio::test]
async fn test_add_list_with_members() {
    let db = setup().await;

    let r1 = register(&db, "alice", 1).await;
    let r2 = register(&db, "bob", 2).await;

    let list_id = db
        .lists
        .add(&MailingList::new(10, "partners".to_string()), &[r1, r2])
        .await
        .expect("Failed to create list");
    assert!(list_id > 0);

    let members = db
        .lists
        .members(list_id)
        .await
        .expect("Failed to load members");
    assert_eq!(members.len(), 2);
    assert_eq!(members[0].tg_username, "alice");
    assert_eq!(members[1].tg_username, "bob");
}

#[tokio::test]
async fn test_members_of_unknown_list_is_empty() {
    let db = setup().await;

    let members = db
        .lists
        .members(404)
        .await
        .expect("Failed to load members");
    assert!(members.is_empty());
}

#[tokio::test]
async fn test_notification_setting_defaults_to_enabled() {
    let db = setup().await;

    assert!(db
        .settings
        .is_enabled(10)
        .await
        .expect("Failed to read setting"));
}

#[tokio::test]
async fn test_notification_setting_toggle() {
    let db = setup().await;

    db.settings
        .set_enabled(10, false)
        .await
        .expect("Failed to set");
    assert!(!db.settings.is_enabled(10).await.expect("Failed to read"));

    db.settings
        .set_enabled(10, true)
        .await
        .expect("Failed to set");
    assert!(db.settings.is_enabled(10).await.expect("Failed to read"));
}
