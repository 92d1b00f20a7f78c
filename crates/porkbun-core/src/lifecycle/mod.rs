//! Resource lifecycle controllers
//!
//! Each controller implements [`Resource`](crate::traits::Resource) for one
//! resource type on top of a shared [`RegistrarApi`](crate::traits::RegistrarApi):
//!
//! - [`GlueRecordResource`]: `porkbun_glue_record`, keyed by `domain:subdomain`
//! - [`DnsRecordResource`]: `porkbun_dns_record`, keyed by the registrar id
//!
//! ## Architecture
//!
//! ```text
//!   desired / persisted state
//!              │
//!              ▼
//!   ┌─────────────────────┐   one call    ┌──────────────┐   HTTP   ┌───────────┐
//!   │ Lifecycle controller │──────────────▶│ RegistrarApi │─────────▶│ Registrar │
//!   └─────────────────────┘               └──────────────┘          └───────────┘
//!              │                                   │
//!              │◀──────── typed records ◀── translate ◀── JSON
//!              ▼
//!   new state / Gone / Error
//! ```
//!
//! ## Guarantees
//!
//! 1. One wire call per lifecycle step, never retried
//! 2. Nothing is cached; controllers are safe to share across tasks
//! 3. A failed step returns an error and no state
//! 4. Cancellation aborts the in-flight call with `Error::Cancelled`

mod dns_record;
mod glue;

pub use dns_record::{DnsRecordPlan, DnsRecordResource, DnsRecordState};
pub use glue::{GlueRecordPlan, GlueRecordResource, GlueRecordState, glue_id};

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// Run one wire call, aborting it if `cancel` fires first
///
/// Dropping the call future drops the in-flight HTTP request. Hosts use it
/// for registrar calls made outside a controller.
pub async fn guarded<T, F>(cancel: &CancellationToken, operation: &str, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;

        _ = cancel.cancelled() => {
            tracing::debug!("Cancellation requested during {}", operation);
            Err(Error::cancelled(format!("{} aborted", operation)))
        }

        result = call => result,
    }
}

/// Split an import identifier into its two colon-separated parts
///
/// The identifier must contain exactly one colon with a non-empty part on
/// each side; `a:b:c` is rejected rather than folded into `(a, "b:c")`.
pub fn parse_import_id(id: &str, format: &str) -> Result<(String, String)> {
    let parts: Vec<&str> = id.split(':').collect();

    match parts.as_slice() {
        [first, second] if !first.is_empty() && !second.is_empty() => {
            Ok((first.to_string(), second.to_string()))
        }
        _ => Err(Error::invalid_input(format!(
            "Unexpected import identifier. Expected format: {}. Got: {:?}",
            format, id
        ))),
    }
}

/// Reject empty or colon-bearing key fields before any network call
pub(crate) fn require_key_field(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::invalid_input(format!("{} cannot be empty", field)));
    }

    if value.contains(':') {
        return Err(Error::invalid_input(format!(
            "{} cannot contain ':'. Got: {:?}",
            field, value
        )));
    }

    Ok(())
}
