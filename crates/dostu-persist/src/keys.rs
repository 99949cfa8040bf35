//! Storage keys shared by every surface that reads or writes chat state.

/// Singleton key holding the id of the session open in the main view
pub const ACTIVE_SESSION_KEY: &str = "activeChatId";

/// Singleton key holding the bounded history index
pub const HISTORY_KEY: &str = "chatHistory";

const SESSION_KEY_PREFIX: &str = "chat_";

/// Key of the canonical record for one session
pub fn session_key(session_id: &str) -> String {
    format!("{}{}", SESSION_KEY_PREFIX, session_id)
}
