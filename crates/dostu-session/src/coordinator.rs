use std::collections::HashMap;
use std::sync::Arc;

use dostu_client::ExchangeClient;
use dostu_persist::{ChatRepository, HistoryEntry, Result as PersistResult};
use dostu_types::{ChatSession, Message};
use tokio_util::sync::CancellationToken;

use crate::exchange::{ExchangeController, ExchangeOutcome, ExchangeState, PendingExchange};

/// How a send or retry request ended, from the presentation's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank text, or a retry with no user message to repeat
    Ignored,
    /// Another exchange is in flight for the active session
    Busy,
    Succeeded,
    Failed,
}

/// In-memory state owned by the coordinator
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Session shown in the main view; `None` after it was deleted
    pub session: Option<ChatSession>,
    pub exchange: ExchangeState,
    /// Consecutive failed exchanges, reset by a success; kept across session switches
    pub failure_count: u32,
}

impl SessionState {
    fn active_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.id.as_str())
    }
}

/// Tracks the active session and exposes the read/mutate surface used by presentation
///
/// The persisted active session pointer is the source of truth across
/// surfaces; in-memory state follows it on `initialize` and
/// `on_foreground_refresh`, last writer wins.
pub struct SessionCoordinator {
    repository: ChatRepository,
    controller: ExchangeController,
    state: SessionState,
    /// Sessions with an exchange in flight, mapped to the user message id it answers
    in_flight: HashMap<String, String>,
}

impl SessionCoordinator {
    pub fn new(repository: ChatRepository, client: Arc<dyn ExchangeClient>) -> Self {
        let controller = ExchangeController::new(client, repository.config().clone());
        Self {
            repository,
            controller,
            state: SessionState::default(),
            in_flight: HashMap::new(),
        }
    }

    /// Create a builder for fluent construction
    pub fn builder() -> crate::builder::CoordinatorBuilder {
        crate::builder::CoordinatorBuilder::new()
    }

    pub fn repository(&self) -> &ChatRepository {
        &self.repository
    }

    pub fn controller(&self) -> &ExchangeController {
        &self.controller
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn active_session(&self) -> Option<&ChatSession> {
        self.state.session.as_ref()
    }

    pub fn active_session_id(&self) -> Option<&str> {
        self.state.active_id()
    }

    pub fn messages(&self) -> &[Message] {
        self.state
            .session
            .as_ref()
            .map(|s| s.messages.as_slice())
            .unwrap_or(&[])
    }

    /// Whether the shown session has an exchange in flight
    pub fn is_busy(&self) -> bool {
        self.state
            .active_id()
            .is_some_and(|id| self.in_flight.contains_key(id))
    }

    pub fn failure_count(&self) -> u32 {
        self.state.failure_count
    }

    /// "(attempt N/M)" for the next attempt after at least one failure
    pub fn attempt_label(&self) -> Option<String> {
        if self.state.failure_count == 0 {
            return None;
        }
        Some(format!(
            "(attempt {}/{})",
            self.state.failure_count + 1,
            self.controller.config().max_attempts_hint
        ))
    }

    /// Open the session named by the active pointer, or create one
    pub async fn initialize(&mut self) -> &ChatSession {
        let session = match self.repository.load_active_session().await {
            Some(session) => {
                tracing::info!(session_id = %session.id, "Restored active session");
                session
            }
            None => self.repository.create_session().await,
        };
        self.replace(session)
    }

    /// Follow the active pointer if it was moved by another surface
    ///
    /// Returns `true` when in-memory state was replaced. With nothing loaded
    /// and nothing to follow, a fresh session is created.
    pub async fn on_foreground_refresh(&mut self) -> bool {
        if let Some(pointer) = self.repository.active_session_id().await {
            if self.state.active_id() != Some(pointer.as_str()) {
                if let Some(session) = self.repository.load_session(&pointer).await {
                    tracing::info!(session_id = %pointer, "Active session changed elsewhere, reloading");
                    self.replace(session);
                    return true;
                }
            }
        }

        if self.state.session.is_none() {
            self.initialize().await;
            return true;
        }
        false
    }

    /// Alias of [`on_foreground_refresh`](Self::on_foreground_refresh)
    pub async fn reconcile(&mut self) -> bool {
        self.on_foreground_refresh().await
    }

    /// Create and switch to a new session
    pub async fn start_new_session(&mut self) -> &ChatSession {
        let session = self.repository.create_session().await;
        self.replace(session)
    }

    /// Make a stored session active and show it
    pub async fn select_session(&mut self, session_id: &str) -> PersistResult<&ChatSession> {
        let session = self.repository.select_session(session_id).await?;
        Ok(self.replace(session))
    }

    pub async fn list_history(&self) -> Vec<ChatSession> {
        self.repository.list_history().await
    }

    pub async fn history_entries(&self) -> Vec<HistoryEntry> {
        self.repository.history_entries(chrono::Utc::now()).await
    }

    pub async fn search_history(&self, query: &str) -> Vec<ChatSession> {
        self.repository.search_history(query).await
    }

    pub async fn load_session(&self, session_id: &str) -> Option<ChatSession> {
        self.repository.load_session(session_id).await
    }

    /// Delete a session; deleting the shown session clears in-memory state
    pub async fn delete_session(&mut self, session_id: &str) -> PersistResult<()> {
        self.repository.delete_session(session_id).await?;
        if self.state.active_id() == Some(session_id) {
            self.state = SessionState {
                failure_count: self.state.failure_count,
                ..SessionState::default()
            };
        }
        Ok(())
    }

    /// Send `text` and wait for the exchange to finish
    pub async fn send_message(&mut self, text: &str) -> SendOutcome {
        self.send_message_with_cancel(text, None).await
    }

    pub async fn send_message_with_cancel(
        &mut self,
        text: &str,
        cancel: Option<CancellationToken>,
    ) -> SendOutcome {
        match self.begin_send(text).await {
            Ok(pending) => {
                let outcome = self.controller.run(pending, cancel).await;
                self.complete(outcome).await
            }
            Err(skipped) => skipped,
        }
    }

    /// Repeat the most recent user message, replacing the last element with the result
    pub async fn retry_last(&mut self) -> SendOutcome {
        match self.begin_retry() {
            Ok(pending) => {
                let outcome = self.controller.run(pending, None).await;
                self.complete(outcome).await
            }
            Err(skipped) => skipped,
        }
    }

    /// First phase of a send: validate, append the user message and mark the exchange in flight
    ///
    /// The returned exchange may be driven with [`ExchangeController::run`]
    /// from another task; its outcome must be handed back to
    /// [`complete`](Self::complete).
    pub async fn begin_send(&mut self, text: &str) -> Result<PendingExchange, SendOutcome> {
        if self.is_busy() {
            tracing::debug!("Send rejected, exchange in flight");
            return Err(SendOutcome::Busy);
        }
        if text.trim().is_empty() {
            return Err(SendOutcome::Ignored);
        }
        if self.state.session.is_none() {
            self.initialize().await;
        }
        self.begin(text, false)
    }

    /// First phase of a retry
    pub fn begin_retry(&mut self) -> Result<PendingExchange, SendOutcome> {
        let text = match self.messages().iter().rev().find(|m| m.is_user()) {
            Some(message) => message.content.clone(),
            None => return Err(SendOutcome::Ignored),
        };
        if self.is_busy() {
            tracing::debug!("Retry rejected, exchange in flight");
            return Err(SendOutcome::Busy);
        }
        self.begin(&text, true)
    }

    /// Second phase: persist the final list and apply it if its session is still shown
    ///
    /// An outcome for a session that is no longer active is still written to
    /// storage but leaves in-memory state alone.
    pub async fn complete(&mut self, outcome: ExchangeOutcome) -> SendOutcome {
        let succeeded = outcome.is_success();

        // A stale outcome must not release a newer exchange on the same session
        if self.in_flight.get(&outcome.session_id) == Some(&outcome.message_id) {
            self.in_flight.remove(&outcome.session_id);
        }

        let saved = match self
            .repository
            .save_messages(&outcome.session_id, outcome.messages.clone())
            .await
        {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::error!(session_id = %outcome.session_id, "Failed to save exchange result: {}", e);
                None
            }
        };

        if self.state.active_id() == Some(outcome.session_id.as_str()) {
            match saved {
                Some(session) => self.state.session = Some(session),
                None => {
                    if let Some(session) = self.state.session.as_mut() {
                        session.messages = outcome.messages;
                    }
                }
            }
            self.state.exchange = ExchangeState::Done { succeeded };
            if succeeded {
                self.state.failure_count = 0;
            } else {
                self.state.failure_count += 1;
            }
        } else {
            tracing::debug!(session_id = %outcome.session_id, "Exchange finished for an inactive session");
        }

        if succeeded {
            SendOutcome::Succeeded
        } else {
            SendOutcome::Failed
        }
    }

    fn begin(&mut self, text: &str, is_retry: bool) -> Result<PendingExchange, SendOutcome> {
        let session = self.state.session.as_mut().ok_or(SendOutcome::Ignored)?;
        let pending = self
            .controller
            .prepare(&session.id, &session.messages, text, is_retry)
            .ok_or(SendOutcome::Ignored)?;

        session.messages = pending.messages.clone();
        self.in_flight
            .insert(pending.session_id.clone(), pending.message_id.clone());
        self.state.exchange = ExchangeState::Sending {
            session_id: pending.session_id.clone(),
            message_id: pending.message_id.clone(),
        };
        Ok(pending)
    }

    fn replace(&mut self, session: ChatSession) -> &ChatSession {
        let exchange = match self.in_flight.get(&session.id) {
            Some(message_id) => ExchangeState::Sending {
                session_id: session.id.clone(),
                message_id: message_id.clone(),
            },
            None => ExchangeState::Idle,
        };
        self.state = SessionState {
            session: None,
            exchange,
            failure_count: self.state.failure_count,
        };
        self.state.session.insert(session)
    }
}
