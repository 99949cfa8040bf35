use async_trait::async_trait;
use dostu_types::{Message, MessageRole};
use serde::{Deserialize, Serialize};

use crate::error::ExchangeError;

/// Remote question-answering endpoint
///
/// One call is one exchange: the outgoing text plus a bounded slice of the
/// conversation goes out, a reply text comes back or the call fails.
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    async fn exchange(&self, request: ExchangeRequest) -> Result<ExchangeReply, ExchangeError>;
}

/// One prior message as sent to the endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: MessageRole,
    pub content: String,
}

impl From<&Message> for HistoryTurn {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

/// Request body of the exchange endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRequest {
    pub message: String,
    pub conversation_history: Vec<HistoryTurn>,
}

impl ExchangeRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            conversation_history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<HistoryTurn>) -> Self {
        self.conversation_history = history;
        self
    }
}

/// Accepted reply: the endpoint reported success and returned non-empty text
#[derive(Debug, Clone)]
pub struct ExchangeReply {
    pub text: String,
    pub raw: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let request = ExchangeRequest::new("Salam").with_history(vec![
            HistoryTurn::from(&Message::assistant("Welcome")),
            HistoryTurn::from(&Message::user("Hi")),
        ]);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "message": "Salam",
                "conversation_history": [
                    {"role": "assistant", "content": "Welcome"},
                    {"role": "user", "content": "Hi"}
                ]
            })
        );
    }

    #[test]
    fn test_history_turn_drops_metadata() {
        let turn = HistoryTurn::from(&Message::error_notice("try again"));
        assert_eq!(turn.role, MessageRole::Assistant);
        assert_eq!(turn.content, "try again");
    }
}
