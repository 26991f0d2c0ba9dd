//! Message logger plugin: one appended row per message event.

use async_trait::async_trait;
use mlog_core::{MessageEvent, Plugin};
use storage::{MessageRecord, MessageRepository, SenderInfo, StorageError};
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument};

use crate::config::LoggerConfig;
use crate::error::LoggerError;

/// Lifecycle: Uninitialized → Ready → Terminated. `handle` is only valid in Ready.
enum LoggerState {
    Uninitialized,
    Ready(MessageRepository),
    Terminated,
}

impl LoggerState {
    fn name(&self) -> &'static str {
        match self {
            LoggerState::Uninitialized => "uninitialized",
            LoggerState::Ready(_) => "ready",
            LoggerState::Terminated => "terminated",
        }
    }
}

/// Persists every message event to the `messages` table.
///
/// The pool lives inside the instance; share it across tasks with `Arc<MessageLogger>`.
pub struct MessageLogger {
    config: LoggerConfig,
    state: RwLock<LoggerState>,
}

impl MessageLogger {
    pub const NAME: &'static str = "message_logger";

    pub fn new(config: LoggerConfig) -> Self {
        Self {
            config,
            state: RwLock::new(LoggerState::Uninitialized),
        }
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    pub async fn is_ready(&self) -> bool {
        matches!(*self.state.read().await, LoggerState::Ready(_))
    }

    /// The live repository, for read-back queries. `None` unless ready.
    pub async fn repository(&self) -> Option<MessageRepository> {
        match &*self.state.read().await {
            LoggerState::Ready(repo) => Some(repo.clone()),
            _ => None,
        }
    }

    /// Maps an event to a row: sender summary plus platform instance id, raw payload as JSON text.
    pub fn build_record(event: &dyn MessageEvent) -> Result<MessageRecord, serde_json::Error> {
        let sender = event.sender();
        let platform = event.platform_meta();
        let sender_info = SenderInfo::new(
            sender.user_id.clone(),
            sender.nickname.clone(),
            platform.id.clone(),
        );

        MessageRecord::new(
            event.message_id().to_string(),
            platform.name.clone(),
            event.self_id().to_string(),
            event.session_id().to_string(),
            event.group_id().map(str::to_string),
            &sender_info,
            event.message_str().to_string(),
            event.raw_message(),
            event.timestamp(),
        )
    }
}

#[async_trait]
impl Plugin for MessageLogger {
    type Error = LoggerError;

    fn name(&self) -> &str {
        Self::NAME
    }

    #[instrument(skip(self))]
    async fn initialize(&self) -> Result<(), LoggerError> {
        // Write lock spans the connect: at most one pool is ever built.
        let mut state = self.state.write().await;
        if !matches!(*state, LoggerState::Uninitialized) {
            return Err(LoggerError::InvalidState(state.name()));
        }

        self.config.validate()?;

        info!(
            min_connections = self.config.min_connections,
            max_connections = self.config.max_connections,
            "step: MessageLogger initialize, opening pool"
        );

        let url = self.config.connection_url();
        let repo = MessageRepository::new(&url, &self.config.pool_settings())
            .await
            .map_err(|e| {
                error!(error = %e, "MessageLogger initialization failed");
                LoggerError::Setup(e)
            })?;

        *state = LoggerState::Ready(repo);
        info!("step: MessageLogger initialize done, ready");
        Ok(())
    }

    #[instrument(
        skip(self, event),
        fields(message_id = %event.message_id(), session_id = %event.session_id())
    )]
    async fn handle(&self, event: &dyn MessageEvent) -> Result<(), LoggerError> {
        let repo = {
            let state = self.state.read().await;
            match &*state {
                LoggerState::Ready(repo) => repo.clone(),
                other => return Err(LoggerError::NotReady(other.name())),
            }
        };

        let record = Self::build_record(event).map_err(|e| {
            error!(error = %e, "Failed to serialize message");
            LoggerError::Persistence(StorageError::Serialization(e))
        })?;

        repo.save(&record).await.map_err(|e| {
            error!(
                error = %e,
                platform = %record.platform_type,
                "Failed to save message"
            );
            LoggerError::Persistence(e)
        })?;

        debug!(platform = %record.platform_type, "Message logged");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn terminate(&self) -> Result<(), LoggerError> {
        let mut state = self.state.write().await;
        match std::mem::replace(&mut *state, LoggerState::Terminated) {
            LoggerState::Ready(repo) => {
                info!("step: MessageLogger terminate, draining pool");
                repo.close().await;
                info!("step: MessageLogger terminate done");
            }
            LoggerState::Uninitialized => {
                *state = LoggerState::Uninitialized;
                debug!("MessageLogger was never initialized, nothing to release");
            }
            LoggerState::Terminated => {
                debug!("MessageLogger already terminated");
            }
        }
        Ok(())
    }
}
