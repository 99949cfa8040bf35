use std::sync::Arc;

use dostu_client::{ExchangeClient, ExchangeError, ExchangeRequest, HistoryTurn};
use dostu_types::{ChatConfig, Message};
use tokio_util::sync::CancellationToken;

/// Lifecycle of the exchange belonging to the active session
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExchangeState {
    #[default]
    Idle,
    /// A request is in flight for the user message with `message_id`
    Sending {
        session_id: String,
        message_id: String,
    },
    Done {
        succeeded: bool,
    },
}

impl ExchangeState {
    pub fn is_sending(&self) -> bool {
        matches!(self, Self::Sending { .. })
    }
}

/// An exchange that has been validated and applied optimistically but not yet sent
#[derive(Debug, Clone)]
pub struct PendingExchange {
    pub session_id: String,
    /// Trimmed outgoing text
    pub text: String,
    pub is_retry: bool,
    /// Id of the user message this exchange answers
    pub message_id: String,
    /// Visible list at send time, including the optimistic user message
    pub messages: Vec<Message>,
    pub request: ExchangeRequest,
}

/// Final message list of a finished exchange plus how it ended
#[derive(Debug)]
pub struct ExchangeOutcome {
    pub session_id: String,
    /// Id of the user message the exchange answered
    pub message_id: String,
    pub is_retry: bool,
    pub messages: Vec<Message>,
    pub error: Option<ExchangeError>,
}

impl ExchangeOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Assistant message (reply or error notice) produced by the exchange
    pub fn reply(&self) -> Option<&Message> {
        self.messages.last()
    }
}

/// Drives single round trips to the remote endpoint
///
/// `prepare` is synchronous and produces the optimistic list; `run` owns all
/// of its inputs so it can be awaited in place or moved into a spawned task.
/// The controller never touches storage.
#[derive(Clone)]
pub struct ExchangeController {
    client: Arc<dyn ExchangeClient>,
    config: ChatConfig,
}

impl ExchangeController {
    pub fn new(client: Arc<dyn ExchangeClient>, config: ChatConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Validate `text` and build the request against the current list
    ///
    /// Returns `None` for blank text. On the normal path the user message is
    /// appended to the returned list; on retry the list is left as is and
    /// `message_id` names the user message being retried.
    pub fn prepare(
        &self,
        session_id: &str,
        messages: &[Message],
        text: &str,
        is_retry: bool,
    ) -> Option<PendingExchange> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        // Context is taken before the new user message is appended
        let history: Vec<HistoryTurn> = self
            .config
            .context_policy
            .window(messages)
            .iter()
            .map(HistoryTurn::from)
            .collect();
        let request = ExchangeRequest::new(text).with_history(history);

        let mut visible = messages.to_vec();
        let message_id = if is_retry {
            messages
                .iter()
                .rev()
                .find(|m| m.is_user())
                .map(|m| m.id.clone())
                .unwrap_or_default()
        } else {
            let user_message = Message::user(text);
            let id = user_message.id.clone();
            visible.push(user_message);
            id
        };

        Some(PendingExchange {
            session_id: session_id.to_string(),
            text: text.to_string(),
            is_retry,
            message_id,
            messages: visible,
            request,
        })
    }

    /// Perform the network call and build the final list
    ///
    /// Expiry of `request_timeout` and cancellation both end in the failure path.
    pub async fn run(&self, pending: PendingExchange, cancel: Option<CancellationToken>) -> ExchangeOutcome {
        let PendingExchange {
            session_id,
            message_id,
            is_retry,
            messages,
            request,
            ..
        } = pending;

        tracing::debug!(
            session_id = %session_id,
            is_retry,
            context = request.conversation_history.len(),
            "Starting exchange"
        );

        let timeout = self.config.request_timeout;
        let call = tokio::time::timeout(timeout, self.client.exchange(request));

        let result = match cancel {
            Some(token) => tokio::select! {
                _ = token.cancelled() => Err(ExchangeError::Cancelled),
                result = call => result.unwrap_or(Err(ExchangeError::Timeout(timeout))),
            },
            None => call.await.unwrap_or(Err(ExchangeError::Timeout(timeout))),
        };

        let (reply, error) = match result {
            Ok(reply) => (Message::assistant(reply.text), None),
            Err(e) => {
                tracing::warn!(session_id = %session_id, "Exchange failed: {}", e);
                (Message::error_notice(&self.config.error_message), Some(e))
            }
        };

        ExchangeOutcome {
            session_id,
            message_id,
            is_retry,
            messages: apply_reply(messages, reply, is_retry),
            error,
        }
    }
}

/// Append `reply`, or on retry substitute it for the last element
fn apply_reply(mut messages: Vec<Message>, reply: Message, is_retry: bool) -> Vec<Message> {
    if is_retry {
        messages.pop();
    }
    messages.push(reply);
    messages
}
