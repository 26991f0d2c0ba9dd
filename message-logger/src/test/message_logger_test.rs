//! Unit tests for MessageLogger: lifecycle states, insert semantics and failure kinds.
//!
//! Uses temp-file SQLite through `database_url`; no external MySQL needed.

use std::sync::Arc;

use crate::{LoggerConfig, LoggerError, MessageLogger};
use mlog_core::{InboundMessage, PlatformMeta, Plugin, Sender};
use serde_json::json;
use sqlx::Connection;
use storage::{SenderInfo, StorageError};
use tempfile::TempDir;

fn sqlite_config(dir: &TempDir) -> LoggerConfig {
    LoggerConfig {
        database_url: Some(format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("botdb.sqlite").display()
        )),
        ..LoggerConfig::default()
    }
}

/// Builds the reference event: qq platform, bot1, session s1, sender u1/Bob.
fn create_test_event(message_id: &str, group_id: Option<&str>) -> InboundMessage {
    InboundMessage {
        message_id: message_id.to_string(),
        sender: Sender {
            user_id: "u1".to_string(),
            nickname: "Bob".to_string(),
        },
        group_id: group_id.map(str::to_string),
        raw_message: json!({"post_type": "message", "message": [{"type": "text", "data": {"text": "hi"}}]}),
        timestamp: 1_700_000_000,
        message_str: "hi".to_string(),
        platform: PlatformMeta {
            name: "qq".to_string(),
            id: "p1".to_string(),
        },
        self_id: "bot1".to_string(),
        session_id: "s1".to_string(),
    }
}

async fn ready_logger(dir: &TempDir) -> MessageLogger {
    let logger = MessageLogger::new(sqlite_config(dir));
    logger.initialize().await.expect("Failed to initialize logger");
    logger
}

/// **Test: the reference event is stored as one row with group_id NULL.**
#[tokio::test]
async fn test_handle_stores_one_row_with_null_group() {
    let dir = tempfile::tempdir().unwrap();
    let logger = ready_logger(&dir).await;

    logger.handle(&create_test_event("m1", Some(""))).await.unwrap();

    let repo = logger.repository().await.unwrap();
    assert_eq!(repo.count_messages().await.unwrap(), 1);

    let row = repo.get_message_by_id("m1").await.unwrap().unwrap();
    assert_eq!(row.platform_type, "qq");
    assert_eq!(row.self_id, "bot1");
    assert_eq!(row.session_id, "s1");
    assert_eq!(row.group_id, None);
    assert_eq!(row.message_str, "hi");
    assert_eq!(row.timestamp, 1_700_000_000);
    assert_eq!(row.raw_message_value().unwrap()["post_type"], "message");
}

/// **Test: sender column carries user_id, nickname and the platform instance id.**
#[tokio::test]
async fn test_handle_sender_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let logger = ready_logger(&dir).await;

    logger.handle(&create_test_event("m1", None)).await.unwrap();

    let row = logger
        .repository()
        .await
        .unwrap()
        .get_message_by_id("m1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.sender_info().unwrap(), SenderInfo::new("u1", "Bob", "p1"));
}

#[tokio::test]
async fn test_handle_keeps_non_empty_group() {
    let dir = tempfile::tempdir().unwrap();
    let logger = ready_logger(&dir).await;

    logger.handle(&create_test_event("m1", Some("g42"))).await.unwrap();

    let row = logger
        .repository()
        .await
        .unwrap()
        .get_message_by_id("m1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.group_id.as_deref(), Some("g42"));
}

/// **Test: duplicate message_id fails as a persistence error; the first row is untouched.**
#[tokio::test]
async fn test_handle_duplicate_message_id() {
    let dir = tempfile::tempdir().unwrap();
    let logger = ready_logger(&dir).await;

    logger.handle(&create_test_event("m1", None)).await.unwrap();

    let mut second = create_test_event("m1", Some("g1"));
    second.message_str = "changed".to_string();
    let err = logger.handle(&second).await.unwrap_err();

    assert!(err.is_duplicate());
    assert!(!err.is_setup());

    let repo = logger.repository().await.unwrap();
    let row = repo.get_message_by_id("m1").await.unwrap().unwrap();
    assert_eq!(row.message_str, "hi");
    assert_eq!(row.group_id, None);
    assert_eq!(repo.count_messages().await.unwrap(), 1);

    // A failed event does not poison the pool.
    logger.handle(&create_test_event("m2", None)).await.unwrap();
    assert_eq!(repo.count_messages().await.unwrap(), 2);
}

/// **Test: unreachable database fails setup, leaves the logger uninitialized, terminate is a no-op.**
#[tokio::test]
async fn test_initialize_unreachable_database() {
    let dir = tempfile::tempdir().unwrap();
    let config = LoggerConfig {
        database_url: Some(format!(
            "sqlite://{}?mode=rw",
            dir.path().join("missing").join("botdb.sqlite").display()
        )),
        ..LoggerConfig::default()
    };
    let logger = MessageLogger::new(config);

    let err = logger.initialize().await.unwrap_err();
    assert!(matches!(err, LoggerError::Setup(_)));
    assert!(err.is_setup());
    assert!(!logger.is_ready().await);
    assert!(logger.repository().await.is_none());

    logger.terminate().await.unwrap();

    let err = logger.handle(&create_test_event("m1", None)).await.unwrap_err();
    assert!(matches!(err, LoggerError::NotReady("uninitialized")));
}

/// **Test: a schema the logger cannot create fails setup after connect and liveness succeed.**
///
/// **Setup:** database where `messages` already exists as a view, so the session index cannot be built.
/// **Expected:** `Setup(Schema(_))`, logger stays uninitialized, terminate is a no-op.
#[tokio::test]
async fn test_initialize_schema_failure() {
    let dir = tempfile::tempdir().unwrap();
    let config = sqlite_config(&dir);
    let url = config.connection_url();

    let mut conn = sqlx::SqliteConnection::connect(&url).await.unwrap();
    sqlx::query("CREATE VIEW messages AS SELECT 'x' AS session_id")
        .execute(&mut conn)
        .await
        .unwrap();
    conn.close().await.unwrap();

    let logger = MessageLogger::new(config);
    let err = logger.initialize().await.unwrap_err();

    assert!(matches!(err, LoggerError::Setup(StorageError::Schema(_))));
    assert!(err.is_setup());
    assert!(!logger.is_ready().await);
    assert!(logger.repository().await.is_none());
    logger.terminate().await.unwrap();
}

#[tokio::test]
async fn test_initialize_rejects_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = LoggerConfig {
        min_connections: 6,
        max_connections: 5,
        ..sqlite_config(&dir)
    };
    let logger = MessageLogger::new(config);

    let err = logger.initialize().await.unwrap_err();
    assert!(matches!(err, LoggerError::Config(_)));
    assert!(!logger.is_ready().await);
}

#[tokio::test]
async fn test_initialize_twice_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let logger = ready_logger(&dir).await;

    let err = logger.initialize().await.unwrap_err();
    assert!(matches!(err, LoggerError::InvalidState("ready")));
    assert!(logger.is_ready().await);
}

/// **Test: terminate releases the pool; later handle calls fail and re-initialize is refused.**
#[tokio::test]
async fn test_terminate_releases_pool() {
    let dir = tempfile::tempdir().unwrap();
    let logger = ready_logger(&dir).await;
    logger.handle(&create_test_event("m1", None)).await.unwrap();
    let repo = logger.repository().await.unwrap();

    logger.terminate().await.unwrap();

    assert!(repo.is_closed());
    assert!(!logger.is_ready().await);
    let err = logger.handle(&create_test_event("m2", None)).await.unwrap_err();
    assert!(matches!(err, LoggerError::NotReady("terminated")));

    // Second terminate is a no-op.
    logger.terminate().await.unwrap();
    let err = logger.initialize().await.unwrap_err();
    assert!(matches!(err, LoggerError::InvalidState("terminated")));
}

#[tokio::test]
async fn test_handle_before_initialize() {
    let dir = tempfile::tempdir().unwrap();
    let logger = MessageLogger::new(sqlite_config(&dir));

    let err = logger.handle(&create_test_event("m1", None)).await.unwrap_err();
    assert!(matches!(err, LoggerError::NotReady("uninitialized")));
}

/// **Test: concurrent handle tasks share one pool bounded at max_connections.**
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_handles() {
    let dir = tempfile::tempdir().unwrap();
    let logger = Arc::new(ready_logger(&dir).await);

    let mut tasks = Vec::new();
    for i in 0..25 {
        let logger = logger.clone();
        tasks.push(tokio::spawn(async move {
            let event = create_test_event(&format!("m{}", i), None);
            logger.handle(&event).await
        }));
    }
    for task in tasks {
        task.await.unwrap().expect("handle failed");
    }

    let repo = logger.repository().await.unwrap();
    assert_eq!(repo.count_messages().await.unwrap(), 25);
    assert_eq!(
        repo.get_recent_messages_by_session("s1", 100).await.unwrap().len(),
        25
    );

    logger.terminate().await.unwrap();
}

#[test]
fn test_plugin_name() {
    let logger = MessageLogger::new(LoggerConfig::default());
    assert_eq!(logger.name(), "message_logger");
}
