//! # Dostu
//!
//! Chat-session lifecycle and persistence manager for clients of a remote
//! question-answering assistant.
//!
//! ## Overview
//!
//! Dostu keeps conversations with the assistant on local durable storage and
//! drives the round trips to the remote endpoint:
//!
//! - **Persist sessions** in any key-value store (in-memory or one file per key)
//! - **Maintain a history index** of the 50 most recently updated sessions
//! - **Exchange messages** with bounded conversation context, timeouts and cancellation
//! - **Recover from failures** with a local error message and retry in place
//! - **Follow the active session** when another surface changes it
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dostu::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(FileStore::open("./data").await?);
//!     let client = Arc::new(HttpExchangeClient::new(&EndpointConfig::new(
//!         "https://assistant.example.com",
//!         std::env::var("DOSTU_API_TOKEN")?,
//!     ))?);
//!
//!     let mut coordinator = SessionCoordinator::builder()
//!         .store(store)
//!         .client(client)
//!         .config(ChatConfig::default())
//!         .build()?;
//!
//!     coordinator.initialize().await;
//!     if coordinator.send_message("Salam").await == SendOutcome::Failed {
//!         coordinator.retry_last().await;
//!     }
//!
//!     for message in coordinator.messages() {
//!         println!("{}: {}", message.role.as_str(), message.content);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`dostu-types`**: messages, sessions and chat configuration
//! - **`dostu-persist`**: key-value stores and the chat repository
//! - **`dostu-client`**: remote endpoint contract and its HTTP client
//! - **`dostu-session`**: exchange controller and session coordinator
//!
//! ## License
//!
//! MIT

pub mod prelude;

pub use dostu_types::{
    derive_title, ChatConfig, ChatSession, ContextPolicy, Message, MessageRole, RecencyLabel,
    DEFAULT_ERROR_MESSAGE, DEFAULT_SESSION_TITLE, DEFAULT_WELCOME_MESSAGE,
};

pub use dostu_persist::{
    ChatRepository, FileStore, HistoryEntry, MemoryStore, PersistError, PersistentStore,
    StoreError,
};

pub use dostu_client::{
    EndpointConfig, ExchangeClient, ExchangeError, ExchangeReply, ExchangeRequest, HistoryTurn,
    HttpExchangeClient,
};

pub use dostu_session::{
    CancellationToken, CoordinatorBuilder, ExchangeController, ExchangeOutcome, ExchangeState,
    PendingExchange, SendOutcome, SessionCoordinator, SessionState,
};
