use dostu_persist::HistoryEntry;
use dostu_types::{ChatSession, Message, MessageRole};

pub fn message(message: &Message) -> String {
    let speaker = match (message.role, message.is_error) {
        (MessageRole::User, _) => "you",
        (MessageRole::Assistant, false) => "dostu",
        (MessageRole::Assistant, true) => "dostu (error)",
    };
    format!("{}> {}", speaker, message.content)
}

pub fn session(session: &ChatSession) -> String {
    let mut out = format!("== {} ==", session.title);
    for m in &session.messages {
        out.push('\n');
        out.push_str(&message(m));
    }
    out
}

pub fn history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No saved chats".to_string();
    }

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            format!(
                "{:>2}. {} ({} messages, {}) [{}]",
                i + 1,
                entry.title,
                entry.user_message_count,
                entry.recency,
                entry.id
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
