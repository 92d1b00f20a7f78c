// # Registrar API Trait
//
// Defines the wire-level interface to the registrar.
//
// ## Implementations
//
// - Porkbun API v3: `porkbun-client` crate
// - In-memory doubles in the contract tests
//
// ## Usage
//
// ```rust,ignore
// use porkbun_core::RegistrarApi;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let registrar = /* RegistrarApi implementation */;
//
//     registrar
//         .create_glue_record("example.com", "ns1", &["192.0.2.1".to_string()])
//         .await?;
//
//     for record in registrar.get_glue_records("example.com").await? {
//         println!("{} -> {:?}", record.host, record.ips);
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::translate::loose_string;

/// One nameserver host and its addresses, as reported by the registrar
///
/// The registrar identifies a glue host by its *full* hostname
/// (`ns1.example.com`), not by the subdomain label used when creating it.
/// Both are kept: `host` is the raw value from the wire and is what
/// reconciliation compares against, `subdomain` is the label recovered by
/// stripping `.{domain}` and is `None` when the host lies outside the
/// domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlueRecord {
    /// Domain the glue list was fetched for
    pub domain: String,
    /// Full hostname as returned by the registrar
    pub host: String,
    /// Bare subdomain label, if `host` ends with `.{domain}`
    pub subdomain: Option<String>,
    /// Addresses, v4 first then v6, in wire order
    pub ips: Vec<String>,
}

/// A DNS record as exchanged with the registrar
///
/// Porkbun string-types its ids and numeric fields, but not consistently:
/// `id`, `ttl` and `prio` are accepted as JSON strings or numbers and
/// always held as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Registrar-assigned id (absent on create requests)
    #[serde(default, skip_serializing, deserialize_with = "loose_string")]
    pub id: Option<String>,

    /// Record name. Requests carry the bare label, responses the full hostname.
    #[serde(default)]
    pub name: String,

    /// Record type (A, AAAA, CNAME, TXT, ...)
    #[serde(rename = "type")]
    pub record_type: String,

    /// Record content
    pub content: String,

    /// Time-to-live in seconds
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "loose_string"
    )]
    pub ttl: Option<String>,

    /// Priority (MX, SRV)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "loose_string"
    )]
    pub prio: Option<String>,

    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Trait for registrar API implementations
///
/// One method is one HTTP round-trip. Implementations must be thread-safe
/// and usable across async tasks; several resources may be reconciled
/// concurrently through the same instance.
///
/// ## Forbidden Capabilities
/// - ❌ Implement retry logic or backoff (a failed attempt is surfaced as-is)
/// - ❌ Cache registrar state between calls
/// - ❌ Check for existence before an upsert
///
/// ## Error Mapping
///
/// - network/timeout → `Error::Transport`
/// - unparseable body → `Error::Decode`
/// - envelope status other than `SUCCESS` → `Error::Api`
#[async_trait]
pub trait RegistrarApi: Send + Sync {
    /// Register (or overwrite) the address set of a glue host
    ///
    /// POST `/domain/createGlue/{domain}/{subdomain}` with `{"ips": [...]}`
    async fn create_glue_record(
        &self,
        domain: &str,
        subdomain: &str,
        ips: &[String],
    ) -> Result<(), crate::Error>;

    /// Replace the address set of a glue host
    ///
    /// Functionally identical to [`RegistrarApi::create_glue_record`]: an
    /// upsert against a distinct endpoint. Implementations must not check
    /// for prior existence.
    ///
    /// POST `/domain/updateGlue/{domain}/{subdomain}` with `{"ips": [...]}`
    async fn update_glue_record(
        &self,
        domain: &str,
        subdomain: &str,
        ips: &[String],
    ) -> Result<(), crate::Error>;

    /// Delete a glue host
    ///
    /// Deleting a host that does not exist succeeds.
    ///
    /// POST `/domain/deleteGlue/{domain}/{subdomain}`
    async fn delete_glue_record(&self, domain: &str, subdomain: &str)
    -> Result<(), crate::Error>;

    /// List every glue host of a domain
    ///
    /// Order follows the wire payload; callers must not rely on it.
    ///
    /// POST `/domain/getGlue/{domain}`
    async fn get_glue_records(&self, domain: &str) -> Result<Vec<GlueRecord>, crate::Error>;

    /// Create a DNS record and return the registrar-assigned id
    ///
    /// POST `/dns/create/{domain}`
    async fn create_dns_record(
        &self,
        domain: &str,
        record: &DnsRecord,
    ) -> Result<String, crate::Error>;

    /// Fetch a DNS record by id
    ///
    /// Returns `Ok(None)` when the registrar reports no record for the id.
    ///
    /// POST `/dns/retrieve/{domain}/{id}`
    async fn get_dns_record(
        &self,
        domain: &str,
        id: &str,
    ) -> Result<Option<DnsRecord>, crate::Error>;

    /// Edit a DNS record in place
    ///
    /// POST `/dns/edit/{domain}/{id}`
    async fn update_dns_record(
        &self,
        domain: &str,
        id: &str,
        record: &DnsRecord,
    ) -> Result<(), crate::Error>;

    /// Delete a DNS record by id
    ///
    /// POST `/dns/delete/{domain}/{id}`
    async fn delete_dns_record(&self, domain: &str, id: &str) -> Result<(), crate::Error>;

    /// Fetch the authoritative nameservers of a domain
    ///
    /// POST `/domain/getNs/{domain}`
    async fn get_nameservers(&self, domain: &str) -> Result<Vec<String>, crate::Error>;

    /// Replace the authoritative nameservers of a domain
    ///
    /// POST `/domain/updateNs/{domain}` with `{"ns": [...]}`
    async fn update_nameservers(
        &self,
        domain: &str,
        nameservers: &[String],
    ) -> Result<(), crate::Error>;

    /// Get the registrar name (for logging/debugging)
    fn registrar_name(&self) -> &'static str;
}
