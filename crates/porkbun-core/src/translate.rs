//! Translation between Porkbun's wire shapes and the typed record model
//!
//! The glue listing is not schema-validated by the registrar. Each host is
//! a two-element array `[fullhost, {"v4": [...], "v6": [...]}]`:
//!
//! ```json
//! {
//!   "status": "SUCCESS",
//!   "hosts": [
//!     ["ns1.example.com", { "v4": ["192.0.2.1"], "v6": ["2001:db8::1"] }]
//!   ]
//! }
//! ```
//!
//! Decoding is skip-and-continue: an entry of the wrong arity, with a
//! non-string hostname or a non-object address map is dropped, and the rest
//! of the batch is still returned. Non-string addresses are dropped from
//! their record.
//!
//! Requests send addresses as one undifferentiated list; grouping by family
//! ([`GlueIps::group`]) is only needed to simulate the registrar's replies.

use std::net::{Ipv4Addr, Ipv6Addr};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::traits::GlueRecord;

/// Address family of an IP literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    /// Dotted-decimal IPv4
    V4,
    /// IPv6
    V6,
}

/// Classify an address literal
///
/// A literal is v4 if it parses as dotted-decimal IPv4, v6 if it parses as
/// IPv6, and unclassified (`None`) otherwise. Malformed literals are not
/// rejected; the caller picks the fallback.
pub fn classify(ip: &str) -> Option<AddressFamily> {
    if ip.parse::<Ipv4Addr>().is_ok() {
        Some(AddressFamily::V4)
    } else if ip.parse::<Ipv6Addr>().is_ok() {
        Some(AddressFamily::V6)
    } else {
        None
    }
}

/// Wire-level grouping of glue addresses by family
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlueIps {
    /// IPv4 addresses
    #[serde(default)]
    pub v4: Vec<String>,
    /// IPv6 addresses
    #[serde(default)]
    pub v6: Vec<String>,
}

impl GlueIps {
    /// Split a flat address list by family, preserving relative order
    ///
    /// Unclassifiable literals land in the v6 bucket.
    pub fn group(ips: &[String]) -> Self {
        let mut grouped = Self::default();
        for ip in ips {
            match classify(ip) {
                Some(AddressFamily::V4) => grouped.v4.push(ip.clone()),
                Some(AddressFamily::V6) | None => grouped.v6.push(ip.clone()),
            }
        }
        grouped
    }

    /// Concatenate v4 then v6 into one list
    pub fn flatten(self) -> Vec<String> {
        let mut ips = self.v4;
        ips.extend(self.v6);
        ips
    }
}

/// One decoded element of the wire host list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEntry {
    /// A well-formed `[hostname, {v4, v6}]` tuple
    Glue {
        /// Full hostname
        host: String,
        /// Addresses, v4 first then v6
        ips: Vec<String>,
    },
    /// Anything else, with the reason it was not recognised
    Malformed(&'static str),
}

impl HostEntry {
    /// Match one raw host-list element against the tuple shape
    pub fn parse(raw: &Value) -> Self {
        let Some(items) = raw.as_array() else {
            return Self::Malformed("entry is not an array");
        };

        let [host, addresses] = items.as_slice() else {
            return Self::Malformed("entry does not have exactly two elements");
        };

        let Some(host) = host.as_str() else {
            return Self::Malformed("hostname is not a string");
        };

        let Some(addresses) = addresses.as_object() else {
            return Self::Malformed("address map is not an object");
        };

        let ips = ["v4", "v6"]
            .into_iter()
            .filter_map(|family| addresses.get(family).and_then(Value::as_array))
            .flatten()
            .filter_map(|ip| ip.as_str().map(str::to_string))
            .collect();

        Self::Glue {
            host: host.to_string(),
            ips,
        }
    }
}

/// Decode a wire host list into glue records for `domain`
///
/// Malformed entries are skipped. Output order is wire order.
pub fn decode_hosts(domain: &str, hosts: &[Value]) -> Vec<GlueRecord> {
    hosts
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| match HostEntry::parse(raw) {
            HostEntry::Glue { host, ips } => Some(GlueRecord {
                domain: domain.to_string(),
                subdomain: strip_domain(&host, domain),
                host,
                ips,
            }),
            HostEntry::Malformed(reason) => {
                tracing::debug!("Skipping glue host entry #{} for {}: {}", index, domain, reason);
                None
            }
        })
        .collect()
}

/// Encode one glue host in the registrar's reply shape
pub fn encode_host(host: &str, ips: &[String]) -> Value {
    serde_json::json!([host, GlueIps::group(ips)])
}

/// Build the full hostname of `subdomain` under `domain`
pub fn full_hostname(subdomain: &str, domain: &str) -> String {
    if subdomain.is_empty() {
        domain.to_string()
    } else {
        format!("{}.{}", subdomain, domain)
    }
}

/// Recover the bare label of `host` under `domain`
///
/// Returns `Some("")` for the apex and `None` when `host` is not inside
/// `domain`.
pub fn strip_domain(host: &str, domain: &str) -> Option<String> {
    if host == domain {
        return Some(String::new());
    }

    host.strip_suffix(domain)
        .and_then(|prefix| prefix.strip_suffix('.'))
        .filter(|label| !label.is_empty())
        .map(str::to_string)
}

/// Deserialize a JSON string or number into `Option<String>`
///
/// Porkbun sends ids and numeric fields sometimes as strings, sometimes as
/// numbers.
pub fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    Ok(Option::<Loose>::deserialize(deserializer)?.map(|value| match value {
        Loose::Text(text) => text,
        Loose::Integer(number) => number.to_string(),
        Loose::Float(number) => number.to_string(),
    }))
}
