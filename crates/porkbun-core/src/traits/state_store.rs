// # State Store Trait
//
// Defines the interface for the host's tracked state.
//
// ## Purpose
//
// The registrar is the source of truth. The state store is the host's
// cached mirror of it: one entry per managed resource, refreshed by each
// Read and overwritten by each successful Create/Update.
//
// ## Implementations
//
// - File-based: JSON file with atomic writes (`state::FileStateStore`)
// - In-memory: tests and one-shot runs (`state::MemoryStateStore`)
//
// ## Usage
//
// ```rust,ignore
// use porkbun_core::StateStore;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let store = /* StateStore implementation */;
//
//     if let Some(record) = store.get("porkbun_glue_record.ns1").await? {
//         println!("{:?}", record.resource);
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::lifecycle::{DnsRecordState, GlueRecordState};

/// Persisted state of one managed resource
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceState {
    /// A glue record (`porkbun_glue_record`)
    GlueRecord(GlueRecordState),
    /// A DNS record (`porkbun_dns_record`)
    DnsRecord(DnsRecordState),
}

impl ResourceState {
    /// Provider-side identifier of the resource
    pub fn id(&self) -> &str {
        match self {
            Self::GlueRecord(state) => &state.id,
            Self::DnsRecord(state) => &state.id,
        }
    }
}

/// State record for a managed resource
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StateRecord {
    /// The resource's persisted attributes
    pub resource: ResourceState,
    /// Timestamp of the last successful create, update or read
    pub last_refreshed: chrono::DateTime<chrono::Utc>,
}

impl StateRecord {
    /// Create a state record stamped with the current time
    pub fn new(resource: ResourceState) -> Self {
        Self {
            resource,
            last_refreshed: chrono::Utc::now(),
        }
    }
}

/// Trait for state store implementations
///
/// Entries are keyed by resource address (`<type_name>.<label>`).
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Get the state record at `address`
    ///
    /// # Returns
    ///
    /// - `Ok(Some(StateRecord))`: The tracked record
    /// - `Ok(None)`: Nothing tracked at this address
    /// - `Err(Error)`: Storage error
    async fn get(&self, address: &str) -> Result<Option<StateRecord>, crate::Error>;

    /// Track `resource` at `address`, replacing any previous entry
    async fn put(&self, address: &str, resource: ResourceState) -> Result<(), crate::Error>;

    /// Stop tracking `address`
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Removed (or wasn't tracked)
    /// - `Err(Error)`: Storage error
    async fn remove(&self, address: &str) -> Result<(), crate::Error>;

    /// List all tracked addresses
    async fn list(&self) -> Result<Vec<String>, crate::Error>;

    /// Persist any pending changes
    async fn flush(&self) -> Result<(), crate::Error>;
}
