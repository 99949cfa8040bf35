use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single chat message as stored in a session record
///
/// Field names follow the on-device storage format (`isError`, camelCase).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl Message {
    fn new(role: MessageRole, content: impl Into<String>, is_error: bool) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            is_error,
        }
    }

    /// Create user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content, false)
    }

    /// Create assistant message with service output
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content, false)
    }

    /// Create a locally synthesized failure notice (assistant role, `is_error` set)
    pub fn error_notice(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content, true)
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_assign_roles() {
        assert_eq!(Message::user("hi").role, MessageRole::User);
        assert_eq!(Message::assistant("hello").role, MessageRole::Assistant);

        let notice = Message::error_notice("failed");
        assert_eq!(notice.role, MessageRole::Assistant);
        assert!(notice.is_error);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Message::user("same");
        let b = Message::user("same");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_is_error_omitted_when_false() {
        let json = serde_json::to_string(&Message::assistant("ok")).unwrap();
        assert!(!json.contains("isError"));

        let json = serde_json::to_string(&Message::error_notice("no")).unwrap();
        assert!(json.contains("\"isError\":true"));
    }

    #[test]
    fn test_deserialize_storage_format() {
        let json = r#"{
            "id": "m-1",
            "role": "user",
            "content": "Salam",
            "timestamp": "2024-11-02T10:15:30.123Z"
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.role, MessageRole::User);
        assert!(!msg.is_error);
        assert_eq!(msg.timestamp.timestamp_subsec_millis(), 123);
    }
}
