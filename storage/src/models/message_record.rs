//! Message record model for persistence.
//!
//! Maps to the `messages` table and is used by MessageRepository.

use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::{FromRow, Row};

use super::sender_info::SenderInfo;

/// One row of `messages`. `sender` and `raw_message` hold serialized JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub message_id: String,
    pub platform_type: String,
    pub self_id: String,
    pub session_id: String,
    pub group_id: Option<String>,
    pub sender: String,
    pub message_str: String,
    pub raw_message: String,
    pub timestamp: i64,
}

impl MessageRecord {
    /// Builds a record, serializing `sender` and `raw_message`. An empty `group_id` is stored as NULL.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        message_id: String,
        platform_type: String,
        self_id: String,
        session_id: String,
        group_id: Option<String>,
        sender: &SenderInfo,
        message_str: String,
        raw_message: &serde_json::Value,
        timestamp: i64,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            message_id,
            platform_type,
            self_id,
            session_id,
            group_id: group_id.filter(|g| !g.is_empty()),
            sender: sender.to_json()?,
            message_str,
            raw_message: serde_json::to_string(raw_message)?,
            timestamp,
        })
    }

    pub fn sender_info(&self) -> Result<SenderInfo, serde_json::Error> {
        SenderInfo::from_json(&self.sender)
    }

    pub fn raw_message_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.raw_message)
    }
}

impl<'r> FromRow<'r, AnyRow> for MessageRecord {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            message_id: text_column(row, "message_id")?,
            platform_type: text_column(row, "platform_type")?,
            self_id: text_column(row, "self_id")?,
            session_id: text_column(row, "session_id")?,
            group_id: optional_text_column(row, "group_id")?,
            sender: text_column(row, "sender")?,
            message_str: text_column(row, "message_str")?,
            raw_message: text_column(row, "raw_message")?,
            timestamp: row.try_get("timestamp")?,
        })
    }
}

fn text_column(row: &AnyRow, name: &str) -> Result<String, sqlx::Error> {
    optional_text_column(row, name)?.ok_or_else(|| sqlx::Error::ColumnDecode {
        index: name.to_string(),
        source: "unexpected NULL".into(),
    })
}

/// MySQL reports TEXT, LONGTEXT and `CAST(.. AS CHAR)` columns as blobs through the Any driver,
/// so fall back to bytes when the value is not tagged as text.
fn optional_text_column(row: &AnyRow, name: &str) -> Result<Option<String>, sqlx::Error> {
    if let Ok(text) = row.try_get::<Option<String>, _>(name) {
        return Ok(text);
    }

    let bytes: Option<Vec<u8>> = row.try_get(name)?;
    bytes
        .map(String::from_utf8)
        .transpose()
        .map_err(|e| sqlx::Error::ColumnDecode {
            index: name.to_string(),
            source: Box::new(e),
        })
}
