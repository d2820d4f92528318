//! Unit tests for TopicRepository.

use crate::database::Database;

async fn setup() -> Database {
    Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create database")
}

#[tokio::test]
async fn test_get_or_create_creates_once() {
    let db = setup().await;

    let first = db
        .topics
        .get_or_create(10, "launch")
        .await
        .expect("Failed to create topic");
    let second = db
        .topics
        .get_or_create(10, "launch")
        .await
        .expect("Failed to get topic");

    assert_eq!(first.topic_id, second.topic_id);
    assert_eq!(second.topic_name, "launch");
    assert_eq!(second.sender_tg_id, 10);
}

#[tokio::test]
async fn test_topics_scoped_per_sender() {
    let db = setup().await;

    let mine = db
        .topics
        .get_or_create(10, "launch")
        .await
        .expect("Failed to create topic");
    let theirs = db
        .topics
        .get_or_create(20, "launch")
        .await
        .expect("Failed to create topic");

    assert_ne!(mine.topic_id, theirs.topic_id);

    let err = db
        .topics
        .get_by_name_and_sender("launch", 30)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_list_by_sender_sorted_by_name() {
    let db = setup().await;

    for name in ["zeta", "alpha", "mid"] {
        db.topics
            .get_or_create(10, name)
            .await
            .expect("Failed to create topic");
    }

    let topics = db
        .topics
        .list_by_sender(10)
        .await
        .expect("Failed to list topics");
    let names: Vec<_> = topics.iter().map(|t| t.topic_name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "mid", "zeta"]);
}

#[tokio::test]
async fn test_get_by_id() {
    let db = setup().await;

    let created = db
        .topics
        .get_or_create(10, "launch")
        .await
        .expect("Failed to create topic");
    let loaded = db
        .topics
        .get_by_id(created.topic_id)
        .await
        .expect("Failed to load topic");
    assert_eq!(loaded.topic_name, "launch");

    assert!(db.topics.get_by_id(9999).await.unwrap_err().is_not_found());
}
