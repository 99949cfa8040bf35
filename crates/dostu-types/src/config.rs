use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::message::Message;

pub const DEFAULT_WELCOME_MESSAGE: &str = "Salam! Mən Yol Dostu botuyam. Azərbaycan Respublikasının yol hərəkəti qaydaları, cərimələr və digər yol məsələləri haqqında suallarınızı cavablandıra bilərəm. Sualınızı yazın!";
pub const DEFAULT_ERROR_MESSAGE: &str = "Üzr istəyirəm, hal-hazırda cavab verə bilmirəm. Zəhmət olmasa bir az sonra yenidən cəhd edin.";
pub const DEFAULT_SESSION_TITLE: &str = "Yeni söhbət";

/// Which part of the visible conversation is sent along with a new message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContextPolicy {
    LastK { k: usize },
    AllMessages,
}

impl Default for ContextPolicy {
    fn default() -> Self {
        Self::LastK { k: 6 }
    }
}

impl ContextPolicy {
    /// Slice of `messages` that forms the conversation history
    pub fn window<'a>(&self, messages: &'a [Message]) -> &'a [Message] {
        match self {
            Self::LastK { k } => &messages[messages.len().saturating_sub(*k)..],
            Self::AllMessages => messages,
        }
    }
}

/// Behaviour of sessions, the history index and exchanges
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    pub context_policy: ContextPolicy,
    /// Deadline for a single round trip; an expired exchange resolves as a failure
    pub request_timeout: Duration,
    /// Shown as "(attempt N/max)"; not enforced
    pub max_attempts_hint: u32,
    pub welcome_message: String,
    pub error_message: String,
    pub default_title: String,
    pub title_max_chars: usize,
    pub history_limit: usize,
    /// Remove per-session records that fall out of the history index
    pub evict_orphans: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            context_policy: ContextPolicy::default(),
            request_timeout: Duration::from_secs(60),
            max_attempts_hint: 3,
            welcome_message: DEFAULT_WELCOME_MESSAGE.to_string(),
            error_message: DEFAULT_ERROR_MESSAGE.to_string(),
            default_title: DEFAULT_SESSION_TITLE.to_string(),
            title_max_chars: 30,
            history_limit: 50,
            evict_orphans: true,
        }
    }
}

impl ChatConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context_policy(mut self, policy: ContextPolicy) -> Self {
        self.context_policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_welcome_message(mut self, text: impl Into<String>) -> Self {
        self.welcome_message = text.into();
        self
    }

    pub fn with_error_message(mut self, text: impl Into<String>) -> Self {
        self.error_message = text.into();
        self
    }

    pub fn with_default_title(mut self, title: impl Into<String>) -> Self {
        self.default_title = title.into();
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_orphan_eviction(mut self, enabled: bool) -> Self {
        self.evict_orphans = enabled;
        self
    }
}
