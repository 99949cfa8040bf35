use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::message::Message;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// One conversation with the assistant
///
/// The same shape is used for the canonical per-session record and for the
/// snapshots kept in the history index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    /// Create a fresh session seeded with a single assistant welcome message
    pub fn new(title: impl Into<String>, welcome: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            messages: vec![Message::assistant(welcome)],
            created_at: now,
            updated_at: now,
        }
    }

    /// Rewrite the title from the first user message while it is still `sentinel`
    ///
    /// Returns true when the title changed. Once the title differs from the
    /// sentinel it is never touched again.
    pub fn apply_title_rule(&mut self, sentinel: &str, max_chars: usize) -> bool {
        if self.title != sentinel {
            return false;
        }

        match self.messages.iter().find(|m| m.is_user()) {
            Some(first) => {
                self.title = derive_title(&first.content, max_chars);
                true
            }
            None => false,
        }
    }

    /// Number of messages authored by the user
    pub fn user_message_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_user()).count()
    }

    /// Most recent message authored by the user
    pub fn last_user_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.is_user())
    }

    /// Recency of the last update relative to `now`
    pub fn recency(&self, now: DateTime<Utc>) -> RecencyLabel {
        RecencyLabel::between(self.updated_at, now)
    }

    /// Case-insensitive match against the title or any message content
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        self.title.to_lowercase().contains(&needle)
            || self
                .messages
                .iter()
                .any(|m| m.content.to_lowercase().contains(&needle))
    }
}

/// Truncate `content` to at most `max_chars` characters, appending `...` when cut
pub fn derive_title(content: &str, max_chars: usize) -> String {
    let mut chars = content.chars();
    let prefix: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", prefix)
    } else {
        prefix
    }
}

/// Coarse "how long ago" label shown next to history entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RecencyLabel {
    Today,
    Yesterday,
    DaysAgo(u32),
    On(NaiveDate),
}

impl RecencyLabel {
    /// Label for `then` relative to `now`, counting started days
    pub fn between(then: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let elapsed = (now - then).num_milliseconds().abs();
        let days = (elapsed + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY;

        match days {
            0 | 1 => Self::Today,
            2 => Self::Yesterday,
            3..=7 => Self::DaysAgo((days - 1) as u32),
            _ => Self::On(then.date_naive()),
        }
    }
}

impl std::fmt::Display for RecencyLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Today => write!(f, "today"),
            Self::Yesterday => write!(f, "yesterday"),
            Self::DaysAgo(n) => write!(f, "{} days ago", n),
            Self::On(date) => write!(f, "{}", date.format("%d.%m.%Y")),
        }
    }
}
