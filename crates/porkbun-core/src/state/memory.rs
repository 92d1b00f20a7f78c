// # Memory State Store
//
// In-memory implementation of StateStore.
//
// ## Purpose
//
// Provides a simple, fast state store that doesn't persist across runs.
// Useful for tests and for hosts that rebuild their state by importing.
//
// ## Crash Behavior
//
// - All tracked state is lost on exit
// - The next run must import resources again before it can manage them

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::state_store::{ResourceState, StateRecord, StateStore};

/// In-memory state store implementation
///
/// This implementation stores all state in a HashMap protected by a RwLock.
/// Clones share the same map.
///
/// # Example
///
/// ```rust,no_run
/// use porkbun_core::lifecycle::GlueRecordState;
/// use porkbun_core::state::MemoryStateStore;
/// use porkbun_core::traits::{ResourceState, StateStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryStateStore::new();
///
///     let state = GlueRecordState {
///         id: "example.com:ns1".to_string(),
///         domain: "example.com".to_string(),
///         subdomain: "ns1".to_string(),
///         ips: ["192.0.2.1".to_string()].into(),
///     };
///     store.put("porkbun_glue_record.ns1", ResourceState::GlueRecord(state)).await?;
///
///     assert!(store.get("porkbun_glue_record.ns1").await?.is_some());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    inner: Arc<RwLock<HashMap<String, StateRecord>>>,
}

impl MemoryStateStore {
    /// Create a new empty memory state store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of tracked resources
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, address: &str) -> Result<Option<StateRecord>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.get(address).cloned())
    }

    async fn put(&self, address: &str, resource: ResourceState) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.insert(address.to_string(), StateRecord::new(resource));
        Ok(())
    }

    async fn remove(&self, address: &str) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.remove(address);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, Error> {
        let guard = self.inner.read().await;
        let mut addresses: Vec<String> = guard.keys().cloned().collect();
        addresses.sort();
        Ok(addresses)
    }

    async fn flush(&self) -> Result<(), Error> {
        // No-op for memory store
        Ok(())
    }
}
