// # Response Envelope
//
// Every Porkbun response is a JSON object with a `status` field next to the
// operation-specific fields:
//
// ```json
// {"status": "SUCCESS", "hosts": [...]}
// {"status": "ERROR", "message": "Invalid API key. (002)"}
// ```
//
// HTTP 200 does not imply success; only the envelope status does.

use porkbun_core::{Error, Result};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use porkbun_core::traits::DnsRecord;
use porkbun_core::translate::loose_string;

/// Envelope status reported on success
const STATUS_SUCCESS: &str = "SUCCESS";

/// Longest body excerpt kept in an HTTP error
const MAX_BODY_EXCERPT: usize = 512;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    status: Option<String>,

    #[serde(default)]
    message: Option<String>,

    #[serde(flatten)]
    body: Map<String, Value>,
}

/// Request body: credentials next to the operation payload
#[derive(Serialize)]
pub(crate) struct Authenticated<'a, T: Serialize> {
    pub apikey: &'a str,
    pub secretapikey: &'a str,
    #[serde(flatten)]
    pub payload: T,
}

/// Payload of calls that send nothing but credentials
#[derive(Serialize)]
pub(crate) struct NoPayload {}

/// `{"ips": [...]}`
#[derive(Serialize)]
pub(crate) struct IpsPayload<'a> {
    pub ips: &'a [String],
}

/// `{"ns": [...]}`
#[derive(Serialize)]
pub(crate) struct NameserversPayload<'a> {
    pub ns: &'a [String],
}

/// Success body of calls that return nothing but the status
pub(crate) type Empty = IgnoredAny;

/// Success body of getGlue
#[derive(Debug, Deserialize)]
pub(crate) struct GlueHosts {
    /// Raw host tuples; `null` when the domain has none
    #[serde(default)]
    pub hosts: Option<Vec<Value>>,
}

/// Success body of dns/create
#[derive(Deserialize)]
pub(crate) struct CreatedRecord {
    #[serde(default, deserialize_with = "loose_string")]
    pub id: Option<String>,
}

/// Success body of dns/retrieve
#[derive(Deserialize)]
pub(crate) struct RetrievedRecords {
    #[serde(default)]
    pub records: Option<Vec<DnsRecord>>,
}

/// Success body of getNs
#[derive(Deserialize)]
pub(crate) struct Nameservers {
    #[serde(default)]
    pub ns: Option<Vec<String>>,
}

/// Decode a response into the success body `T`
///
/// - 2xx or not, an envelope with a non-`SUCCESS` status is an API error
/// - a body that is not an envelope is an HTTP error on non-2xx and a
///   decode error otherwise
/// - a `SUCCESS` envelope whose fields do not fit `T` is a decode error
pub(crate) fn decode<T: DeserializeOwned>(status: u16, text: &str) -> Result<T> {
    let success = (200..300).contains(&status);

    let envelope: Envelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(_) if !success => return Err(Error::http(status, excerpt(text))),
        Err(e) => {
            return Err(Error::decode(format!(
                "Response is not a JSON envelope: {}",
                e
            )));
        }
    };

    match envelope.status.as_deref() {
        Some(STATUS_SUCCESS) if success => T::deserialize(Value::Object(envelope.body))
            .map_err(|e| Error::decode(format!("Unexpected response body: {}", e))),
        Some(STATUS_SUCCESS) => Err(Error::http(status, excerpt(text))),
        Some(other) => Err(Error::api(
            envelope
                .message
                .unwrap_or_else(|| format!("Registrar returned status {}", other)),
        )),
        None if !success => Err(Error::http(status, excerpt(text))),
        None => Err(Error::decode("Response envelope has no status")),
    }
}

fn excerpt(text: &str) -> String {
    if text.len() <= MAX_BODY_EXCERPT {
        return text.to_string();
    }

    let mut end = MAX_BODY_EXCERPT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
