mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::StoreError;

/// Durable key-value storage supplied by the host platform
///
/// Values are opaque string blobs. Each `set` replaces a single key
/// atomically; there are no transactions spanning several keys.
#[async_trait]
pub trait PersistentStore: Send + Sync {
    /// Read the blob stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the blob stored under `key`
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Remove `key`; removing an absent key succeeds
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}
