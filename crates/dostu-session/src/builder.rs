use std::sync::Arc;
use anyhow::{anyhow, Result};

use dostu_client::ExchangeClient;
use dostu_persist::{ChatRepository, PersistentStore};
use dostu_types::ChatConfig;

use crate::coordinator::SessionCoordinator;

/// Builder for constructing a SessionCoordinator
pub struct CoordinatorBuilder {
    store: Option<Arc<dyn PersistentStore>>,
    client: Option<Arc<dyn ExchangeClient>>,
    config: ChatConfig,
}

impl CoordinatorBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            client: None,
            config: ChatConfig::default(),
        }
    }

    /// Set the persistent store
    pub fn store(mut self, store: Arc<dyn PersistentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the exchange client
    pub fn client(mut self, client: Arc<dyn ExchangeClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the chat configuration
    pub fn config(mut self, config: ChatConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the SessionCoordinator
    ///
    /// The coordinator starts empty; call `initialize` before use.
    pub fn build(self) -> Result<SessionCoordinator> {
        let store = self.store
            .ok_or_else(|| anyhow!("Persistent store is required"))?;
        let client = self.client
            .ok_or_else(|| anyhow!("Exchange client is required"))?;

        let repository = ChatRepository::new(store, self.config);
        Ok(SessionCoordinator::new(repository, client))
    }
}

impl Default for CoordinatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
