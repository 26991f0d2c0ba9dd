//! Integration tests for [`storage::MessageRepository`].
//!
//! Covers insert/read-back, NULL group ids, session ordering and concurrent inserts using a temp-file SQLite database.

use serde_json::json;
use storage::{MessageRecord, MessageRepository, PoolSettings, SenderInfo};
use tempfile::TempDir;

async fn open_repo(dir: &TempDir) -> MessageRepository {
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("messages.db").display());
    MessageRepository::new(&url, &PoolSettings::default())
        .await
        .expect("Failed to create repository")
}

fn record(message_id: &str, session_id: &str, group_id: Option<&str>, timestamp: i64) -> MessageRecord {
    MessageRecord::new(
        message_id.to_string(),
        "qq".to_string(),
        "bot1".to_string(),
        session_id.to_string(),
        group_id.map(str::to_string),
        &SenderInfo::new("u1", "Bob", "p1"),
        format!("text of {}", message_id),
        &json!({"message_id": message_id, "segments": [{"type": "text"}]}),
        timestamp,
    )
    .unwrap()
}

/// **Test: a saved record reads back field for field.**
///
/// **Setup:** Empty DB; save message "m1" in group "g1".
/// **Action:** `get_message_by_id("m1")`.
/// **Expected:** Same record; sender and raw payload decode to the original structures.
#[tokio::test]
async fn test_save_and_get_message_by_id() {
    let dir = tempfile::tempdir().unwrap();
    let repo = open_repo(&dir).await;
    let original = record("m1", "s1", Some("g1"), 1_700_000_000);

    repo.save(&original).await.expect("Failed to save message");

    let stored = repo
        .get_message_by_id("m1")
        .await
        .expect("Failed to get message")
        .expect("message missing");

    assert_eq!(stored, original);
    assert_eq!(stored.sender_info().unwrap(), SenderInfo::new("u1", "Bob", "p1"));
    assert_eq!(stored.raw_message_value().unwrap()["message_id"], "m1");
}

/// **Test: an empty group id is stored as NULL.**
#[tokio::test]
async fn test_empty_group_id_stored_as_null() {
    let dir = tempfile::tempdir().unwrap();
    let repo = open_repo(&dir).await;

    repo.save(&record("m1", "s1", Some(""), 1)).await.unwrap();

    let stored = repo.get_message_by_id("m1").await.unwrap().unwrap();
    assert_eq!(stored.group_id, None);
}

#[tokio::test]
async fn test_get_message_by_id_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let repo = open_repo(&dir).await;

    let retrieved = repo
        .get_message_by_id("non-existent-id")
        .await
        .expect("Failed to query");

    assert!(retrieved.is_none());
}

/// **Test: recent messages are filtered by session and ordered newest first.**
///
/// **Setup:** 15 messages in "s1" with increasing timestamps, 5 in "s2".
/// **Action:** `get_recent_messages_by_session("s1", 10)`.
/// **Expected:** 10 messages, all from "s1", timestamps descending starting at the newest.
#[tokio::test]
async fn test_get_recent_messages_by_session() {
    let dir = tempfile::tempdir().unwrap();
    let repo = open_repo(&dir).await;

    for i in 0..15 {
        repo.save(&record(&format!("s1-{}", i), "s1", None, 1000 + i))
            .await
            .expect("Failed to save message");
    }
    for i in 0..5 {
        repo.save(&record(&format!("s2-{}", i), "s2", Some("g2"), 2000 + i))
            .await
            .expect("Failed to save message");
    }

    let recent = repo
        .get_recent_messages_by_session("s1", 10)
        .await
        .expect("Failed to get recent messages");

    assert_eq!(recent.len(), 10);
    assert!(recent.iter().all(|m| m.session_id == "s1"));
    assert_eq!(recent[0].timestamp, 1014);
    assert!(recent.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));

    assert!(repo
        .get_recent_messages_by_session("nobody", 10)
        .await
        .unwrap()
        .is_empty());
}

/// **Test: concurrent inserts through one pool all land.**
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_saves_share_pool() {
    let dir = tempfile::tempdir().unwrap();
    let repo = open_repo(&dir).await;

    let mut tasks = Vec::new();
    for i in 0..20 {
        let repo = repo.clone();
        tasks.push(tokio::spawn(async move {
            let message = record(&format!("c{}", i), "s1", None, i);
            repo.save(&message).await
        }));
    }
    for task in tasks {
        task.await.unwrap().expect("concurrent save failed");
    }

    assert_eq!(repo.count_messages().await.unwrap(), 20);
}
