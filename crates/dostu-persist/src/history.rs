use chrono::{DateTime, Utc};
use dostu_types::{ChatSession, RecencyLabel};
use serde::{Deserialize, Serialize};

/// Row shown for one session in the history list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub title: String,
    pub user_message_count: usize,
    pub updated_at: DateTime<Utc>,
    pub recency: RecencyLabel,
}

impl HistoryEntry {
    pub fn from_session(session: &ChatSession, now: DateTime<Utc>) -> Self {
        Self {
            id: session.id.clone(),
            title: session.title.clone(),
            user_message_count: session.user_message_count(),
            updated_at: session.updated_at,
            recency: session.recency(now),
        }
    }
}

/// Insert `session` at the front of `index`, replacing any entry with the same id
///
/// Returns the entries that no longer fit under `limit`.
pub(crate) fn upsert_front(
    index: &mut Vec<ChatSession>,
    session: ChatSession,
    limit: usize,
) -> Vec<ChatSession> {
    index.retain(|entry| entry.id != session.id);
    index.insert(0, session);

    if index.len() > limit {
        index.split_off(limit)
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dostu_types::Message;

    fn session(title: &str) -> ChatSession {
        let mut s = ChatSession::new("New chat", "Welcome!");
        s.title = title.to_string();
        s
    }

    #[test]
    fn test_entry_counts_user_messages() {
        let mut s = session("Parking");
        s.messages.push(Message::user("q1"));
        s.messages.push(Message::assistant("a1"));
        s.messages.push(Message::user("q2"));

        let entry = HistoryEntry::from_session(&s, s.updated_at);
        assert_eq!(entry.user_message_count, 2);
        assert_eq!(entry.recency, RecencyLabel::Today);
        assert_eq!(entry.title, "Parking");
    }

    #[test]
    fn test_upsert_moves_existing_to_front() {
        let a = session("a");
        let b = session("b");
        let mut index = vec![b.clone(), a.clone()];

        let mut updated_a = a.clone();
        updated_a.title = "a2".to_string();
        let dropped = upsert_front(&mut index, updated_a, 50);

        assert!(dropped.is_empty());
        assert_eq!(index.len(), 2);
        assert_eq!(index[0].title, "a2");
        assert_eq!(index[1].id, b.id);
    }

    #[test]
    fn test_upsert_truncates_tail() {
        let mut index: Vec<ChatSession> = (0..3).map(|i| session(&i.to_string())).collect();
        let oldest = index[2].id.clone();

        let dropped = upsert_front(&mut index, session("new"), 3);

        assert_eq!(index.len(), 3);
        assert_eq!(index[0].title, "new");
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].id, oldest);
    }
}
