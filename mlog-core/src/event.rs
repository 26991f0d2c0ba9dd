//! Inbound event contract: the subset of a host message event the logger reads.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Message author as reported by the platform adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub user_id: String,
    pub nickname: String,
}

/// Originating platform adapter: `name` is the platform type (e.g. "qq"), `id` the adapter instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformMeta {
    pub name: String,
    pub id: String,
}

/// Read-only view of a host message event. Hosts implement this for their own event type;
/// the logger never sees anything beyond these accessors.
pub trait MessageEvent: Send + Sync {
    fn message_id(&self) -> &str;
    fn sender(&self) -> &Sender;
    /// Group the message was posted in; `None` for direct sessions. May be `Some("")` on some hosts.
    fn group_id(&self) -> Option<&str>;
    /// Original platform payload, shape is platform-specific.
    fn raw_message(&self) -> &serde_json::Value;
    /// Event time in seconds.
    fn timestamp(&self) -> i64;
    /// Human-readable rendering of the message.
    fn message_str(&self) -> &str;
    fn platform_meta(&self) -> &PlatformMeta;
    /// The bot's own id on the platform.
    fn self_id(&self) -> &str;
    fn session_id(&self) -> &str;
}

/// Message event delivered as JSON (one object per line in the CLI host).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub message_id: String,
    pub sender: Sender,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub raw_message: serde_json::Value,
    pub timestamp: i64,
    pub message_str: String,
    pub platform: PlatformMeta,
    pub self_id: String,
    pub session_id: String,
}

impl InboundMessage {
    /// Parses one JSON object and validates it.
    pub fn from_json(line: &str) -> Result<Self> {
        let message: InboundMessage = serde_json::from_str(line)?;
        message.validate()?;
        Ok(message)
    }

    /// Rejects events that cannot be stored: the message id is the primary key.
    pub fn validate(&self) -> Result<()> {
        if self.message_id.trim().is_empty() {
            return Err(CoreError::InvalidEvent("message_id is empty".to_string()));
        }
        Ok(())
    }
}

impl MessageEvent for InboundMessage {
    fn message_id(&self) -> &str {
        &self.message_id
    }

    fn sender(&self) -> &Sender {
        &self.sender
    }

    fn group_id(&self) -> Option<&str> {
        self.group_id.as_deref()
    }

    fn raw_message(&self) -> &serde_json::Value {
        &self.raw_message
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }

    fn message_str(&self) -> &str {
        &self.message_str
    }

    fn platform_meta(&self) -> &PlatformMeta {
        &self.platform
    }

    fn self_id(&self) -> &str {
        &self.self_id
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }
}
