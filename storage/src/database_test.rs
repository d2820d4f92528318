//! Tests for Database over a file-backed pool.

use tempfile::TempDir;

use crate::database::Database;
use crate::models::Recipient;

#[tokio::test]
async fn test_connect_creates_missing_database_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("bot.db");
    let url = format!("sqlite:{}", db_path.display());

    let db = Database::connect(&url)
        .await
        .expect("Failed to create database");
    assert!(db_path.exists());

    let id = db
        .recipients
        .add(&Recipient::new(
            "Alice Example".to_string(),
            "alice".to_string(),
            1001,
        ))
        .await
        .expect("Failed to add recipient");

    // Reconnecting to the same file sees the persisted row.
    drop(db);
    let db = Database::connect(&url)
        .await
        .expect("Failed to reopen database");
    let found = db
        .recipients
        .get_by_tg_ids(&[1001])
        .await
        .expect("Failed to query");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].recipient_id, id);
}
