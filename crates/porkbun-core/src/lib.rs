// # porkbun-core
//
// Core library for the Porkbun registrar provider.
//
// ## Architecture Overview
//
// This library provides everything except the HTTP transport:
// - **RegistrarApi**: Trait for one-call-per-operation registrar access
// - **translate**: Glue record wire format <-> flat address lists
// - **Resource**: Lifecycle contract (plan/create/read/update/delete/import)
// - **lifecycle**: Controllers for `porkbun_glue_record` and `porkbun_dns_record`
// - **StateStore**: The host's tracked mirror of registrar state
//
// ## Design Principles
//
// 1. **Registrar is the source of truth**: Read always reflects upstream
// 2. **No caching, no retries**: Each lifecycle step is one wire call
// 3. **Library-First**: The transport is injected behind `RegistrarApi`
// 4. **Typed failures**: Every error carries an `ErrorKind`

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod state;
pub mod traits;
pub mod translate;

// Re-export core types for convenience
pub use config::{DEFAULT_BASE_URL, ProviderConfig};
pub use error::{Error, ErrorKind, Result};
pub use lifecycle::{
    DnsRecordPlan, DnsRecordResource, DnsRecordState, GlueRecordPlan, GlueRecordResource,
    GlueRecordState,
};
pub use state::{FileStateStore, MemoryStateStore};
pub use traits::{RegistrarApi, Resource, StateStore};
