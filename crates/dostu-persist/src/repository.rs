use chrono::{DateTime, Utc};
use std::sync::Arc;

use dostu_types::{ChatConfig, ChatSession, Message};

use crate::error::{PersistError, Result};
use crate::history::{upsert_front, HistoryEntry};
use crate::keys::{session_key, ACTIVE_SESSION_KEY, HISTORY_KEY};
use crate::store::PersistentStore;

/// Owns the on-store representation of chat sessions, the history index and
/// the active session pointer
///
/// Reads never fail: missing or corrupt data is logged and reported as
/// absent. Writes that presentation may want to report return `Result`.
#[derive(Clone)]
pub struct ChatRepository {
    store: Arc<dyn PersistentStore>,
    config: ChatConfig,
}

impl ChatRepository {
    pub fn new(store: Arc<dyn PersistentStore>, config: ChatConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Create a session seeded with the welcome message and make it active
    ///
    /// Storage failures are logged; the in-memory session is returned regardless.
    pub async fn create_session(&self) -> ChatSession {
        let session = ChatSession::new(&self.config.default_title, &self.config.welcome_message);

        if let Err(e) = self.write_session(&session).await {
            tracing::error!(session_id = %session.id, "Failed to persist new session: {}", e);
        }
        if let Err(e) = self.set_active_pointer(&session.id).await {
            tracing::error!(session_id = %session.id, "Failed to set active session: {}", e);
        }
        if let Err(e) = self.upsert_history(&session).await {
            tracing::error!(session_id = %session.id, "Failed to add session to history: {}", e);
        }

        tracing::info!(session_id = %session.id, "Created chat session");
        session
    }

    /// Load one session record; missing or unreadable records yield `None`
    pub async fn load_session(&self, session_id: &str) -> Option<ChatSession> {
        match self.read_session(session_id).await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(session_id, "Treating unreadable session record as missing: {}", e);
                None
            }
        }
    }

    /// Id stored in the active session pointer
    pub async fn active_session_id(&self) -> Option<String> {
        match self.store.get(ACTIVE_SESSION_KEY).await {
            Ok(id) => id.filter(|id| !id.is_empty()),
            Err(e) => {
                tracing::warn!("Failed to read active session pointer: {}", e);
                None
            }
        }
    }

    /// Session named by the active pointer, if both exist
    pub async fn load_active_session(&self) -> Option<ChatSession> {
        let session_id = self.active_session_id().await?;
        let session = self.load_session(&session_id).await;
        if session.is_none() {
            tracing::warn!(session_id = %session_id, "Active session pointer refers to a missing record");
        }
        session
    }

    /// Point the active session pointer at an existing session
    pub async fn select_session(&self, session_id: &str) -> Result<ChatSession> {
        let session = self
            .load_session(session_id)
            .await
            .ok_or_else(|| PersistError::SessionNotFound(session_id.to_string()))?;

        self.set_active_pointer(session_id).await?;
        tracing::info!(session_id, "Selected chat session");
        Ok(session)
    }

    /// Replace the messages of a stored session
    ///
    /// Applies the title rule, bumps `updated_at`, persists the record and
    /// refreshes its history entry. A failed history refresh is logged only;
    /// the canonical record is what counts.
    pub async fn save_messages(&self, session_id: &str, messages: Vec<Message>) -> Result<ChatSession> {
        let mut session = self
            .load_session(session_id)
            .await
            .ok_or_else(|| PersistError::SessionNotFound(session_id.to_string()))?;

        session.messages = messages;
        if session.apply_title_rule(&self.config.default_title, self.config.title_max_chars) {
            tracing::debug!(session_id, title = %session.title, "Assigned session title");
        }
        session.updated_at = Utc::now();

        self.write_session(&session).await?;

        if let Err(e) = self.upsert_history(&session).await {
            tracing::warn!(session_id, "Failed to refresh history entry: {}", e);
        }

        tracing::debug!(session_id, messages = session.messages.len(), "Saved session messages");
        Ok(session)
    }

    /// Put `session` at the front of the history index and enforce the cap
    pub async fn upsert_history(&self, session: &ChatSession) -> Result<()> {
        let mut index = self.list_history().await;
        let dropped = upsert_front(&mut index, session.clone(), self.config.history_limit);

        self.store
            .set(HISTORY_KEY, serde_json::to_string(&index)?)
            .await?;

        if self.config.evict_orphans && !dropped.is_empty() {
            self.evict(&dropped).await;
        }

        Ok(())
    }

    /// Remove a session record, its history entry and, if it was active, the pointer
    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.store.remove(&session_key(session_id)).await?;

        let mut index = self.list_history().await;
        index.retain(|entry| entry.id != session_id);
        self.store
            .set(HISTORY_KEY, serde_json::to_string(&index)?)
            .await?;

        if self.active_session_id().await.as_deref() == Some(session_id) {
            self.store.remove(ACTIVE_SESSION_KEY).await?;
            tracing::debug!(session_id, "Cleared active session pointer");
        }

        tracing::info!(session_id, "Deleted chat session");
        Ok(())
    }

    /// History index, most recently updated first
    pub async fn list_history(&self) -> Vec<ChatSession> {
        let raw = match self.store.get(HISTORY_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read history index: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(index) => index,
            Err(e) => {
                tracing::warn!("Discarding corrupt history index: {}", e);
                Vec::new()
            }
        }
    }

    /// History rows for display, with recency computed against `now`
    pub async fn history_entries(&self, now: DateTime<Utc>) -> Vec<HistoryEntry> {
        self.list_history()
            .await
            .iter()
            .map(|session| HistoryEntry::from_session(session, now))
            .collect()
    }

    /// History sessions whose title or content contains `query` (case-insensitive)
    pub async fn search_history(&self, query: &str) -> Vec<ChatSession> {
        self.list_history()
            .await
            .into_iter()
            .filter(|session| session.matches(query))
            .collect()
    }

    async fn read_session(&self, session_id: &str) -> Result<Option<ChatSession>> {
        match self.store.get(&session_key(session_id)).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn write_session(&self, session: &ChatSession) -> Result<()> {
        let raw = serde_json::to_string(session)?;
        self.store.set(&session_key(&session.id), raw).await?;
        Ok(())
    }

    async fn set_active_pointer(&self, session_id: &str) -> Result<()> {
        self.store
            .set(ACTIVE_SESSION_KEY, session_id.to_string())
            .await?;
        Ok(())
    }

    async fn evict(&self, dropped: &[ChatSession]) {
        let active = self.active_session_id().await;

        for session in dropped {
            if active.as_deref() == Some(session.id.as_str()) {
                continue;
            }
            match self.store.remove(&session_key(&session.id)).await {
                Ok(()) => tracing::debug!(session_id = %session.id, "Evicted session beyond history limit"),
                Err(e) => tracing::warn!(session_id = %session.id, "Failed to evict session record: {}", e),
            }
        }
    }
}
