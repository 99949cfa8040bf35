//! Prelude module for convenient imports
//!
//! Import everything you need with:
//! ```rust
//! use dostu::prelude::*;
//! ```

pub use crate::{
    ChatConfig, ChatSession, ContextPolicy, Message, MessageRole,
    ChatRepository, FileStore, MemoryStore, PersistentStore, HistoryEntry,
    EndpointConfig, ExchangeClient, HttpExchangeClient,
    CoordinatorBuilder, SessionCoordinator, SendOutcome, CancellationToken,
};
