pub mod config;
pub mod message;
pub mod session;

pub use config::{
    ContextPolicy, ChatConfig, DEFAULT_ERROR_MESSAGE, DEFAULT_SESSION_TITLE,
    DEFAULT_WELCOME_MESSAGE,
};
pub use message::{Message, MessageRole};
pub use session::{derive_title, ChatSession, RecencyLabel};
