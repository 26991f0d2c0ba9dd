//! Sender summary stored (as JSON text) in the `sender` column.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderInfo {
    pub user_id: String,
    pub nickname: String,
    /// Platform adapter instance the message arrived through.
    pub platform_id: String,
}

impl SenderInfo {
    pub fn new(
        user_id: impl Into<String>,
        nickname: impl Into<String>,
        platform_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            nickname: nickname.into(),
            platform_id: platform_id.into(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_json_round_trip() {
        let sender = SenderInfo::new("u1", "Bob", "p1");
        let json = sender.to_json().unwrap();

        assert_eq!(SenderInfo::from_json(&json).unwrap(), sender);
    }

    #[test]
    fn test_sender_json_field_names() {
        let json = SenderInfo::new("u1", "Bob", "p1").to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["user_id"], "u1");
        assert_eq!(value["nickname"], "Bob");
        assert_eq!(value["platform_id"], "p1");
    }

    #[test]
    fn test_sender_from_json_missing_field() {
        assert!(SenderInfo::from_json(r#"{"user_id":"u1","nickname":"Bob"}"#).is_err());
    }
}
