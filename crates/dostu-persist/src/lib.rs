pub mod error;
pub mod history;
pub mod keys;
pub mod repository;
pub mod store;

pub use error::{PersistError, Result, StoreError};
pub use history::HistoryEntry;
pub use repository::ChatRepository;
pub use store::{FileStore, MemoryStore, PersistentStore};
