//! Message repository: schema bootstrap, append-only insert and read-back queries.
//!
//! Uses DbPoolManager and MessageRecord. Rows are never updated or deleted here.

use tracing::{debug, info};

use crate::db_pool::{DbPoolManager, PoolSettings};
use crate::error::StorageError;
use crate::models::MessageRecord;

#[derive(Clone)]
pub struct MessageRepository {
    pool_manager: DbPoolManager,
}

impl MessageRepository {
    /// Connects, checks liveness and creates the `messages` table if absent.
    pub async fn new(database_url: &str, settings: &PoolSettings) -> Result<Self, StorageError> {
        let pool_manager = DbPoolManager::new(database_url, settings).await?;
        let repo = Self { pool_manager };
        if let Err(e) = repo.init().await {
            repo.close().await;
            return Err(e);
        }
        Ok(repo)
    }

    async fn init(&self) -> Result<(), StorageError> {
        info!("Creating messages table if not exist");

        let pool = self.pool_manager.pool();
        let dialect = self.pool_manager.dialect();

        sqlx::query(dialect.create_table_sql())
            .execute(pool)
            .await
            .map_err(StorageError::Schema)?;

        if let Some(index_sql) = dialect.create_index_sql() {
            sqlx::query(index_sql)
                .execute(pool)
                .await
                .map_err(StorageError::Schema)?;
        }

        info!("Messages table ready");
        Ok(())
    }

    /// Inserts one row. A second row with the same `message_id` fails with
    /// [`StorageError::DuplicateMessage`] and leaves the first untouched.
    pub async fn save(&self, record: &MessageRecord) -> Result<(), StorageError> {
        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            INSERT INTO messages (message_id, platform_type, self_id, session_id, group_id, sender, message_str, raw_message, timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.message_id)
        .bind(&record.platform_type)
        .bind(&record.self_id)
        .bind(&record.session_id)
        .bind(&record.group_id)
        .bind(&record.sender)
        .bind(&record.message_str)
        .bind(&record.raw_message)
        .bind(record.timestamp)
        .execute(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StorageError::DuplicateMessage(record.message_id.clone())
            }
            other => StorageError::Database(other),
        })?;

        debug!(
            message_id = %record.message_id,
            session_id = %record.session_id,
            "Saved message"
        );
        Ok(())
    }

    pub async fn get_message_by_id(
        &self,
        message_id: &str,
    ) -> Result<Option<MessageRecord>, StorageError> {
        let pool = self.pool_manager.pool();
        let sql = format!(
            "SELECT {} FROM messages WHERE message_id = ?",
            self.pool_manager.dialect().select_columns()
        );

        let message = sqlx::query_as::<_, MessageRecord>(&sql)
            .bind(message_id)
            .fetch_optional(pool)
            .await?;

        Ok(message)
    }

    /// Most recent first (by event timestamp).
    pub async fn get_recent_messages_by_session(
        &self,
        session_id: &str,
        limit: i64,
    ) -> Result<Vec<MessageRecord>, StorageError> {
        let pool = self.pool_manager.pool();
        let sql = format!(
            "SELECT {} FROM messages WHERE session_id = ? ORDER BY timestamp DESC LIMIT ?",
            self.pool_manager.dialect().select_columns()
        );

        let messages = sqlx::query_as::<_, MessageRecord>(&sql)
            .bind(session_id)
            .bind(limit)
            .fetch_all(pool)
            .await?;

        info!(
            session_id = %session_id,
            count = messages.len(),
            "Retrieved recent messages for session"
        );

        Ok(messages)
    }

    pub async fn count_messages(&self) -> Result<i64, StorageError> {
        let pool = self.pool_manager.pool();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Closes the underlying pool; later calls fail with a pool-closed database error.
    pub async fn close(&self) {
        self.pool_manager.close().await;
    }

    pub fn is_closed(&self) -> bool {
        self.pool_manager.is_closed()
    }

    #[cfg(test)]
    pub(crate) fn pool_manager(&self) -> &DbPoolManager {
        &self.pool_manager
    }
}
