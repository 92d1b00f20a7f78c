//! Core traits for the Porkbun provider
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`RegistrarApi`]: One HTTP round-trip per registrar operation
//! - [`Resource`]: Create/read/update/delete/import lifecycle of a resource type
//! - [`StateStore`]: The host's tracked mirror of registrar state

pub mod registrar;
pub mod resource;
pub mod state_store;

pub use registrar::{DnsRecord, GlueRecord, RegistrarApi};
pub use resource::{AttributeKind, AttributeSchema, PlanAction, ReadOutcome, Resource, ResourceSchema};
pub use state_store::{ResourceState, StateRecord, StateStore};
