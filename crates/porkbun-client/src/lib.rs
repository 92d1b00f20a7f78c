// # Porkbun API v3 Client
//
// This crate provides the `RegistrarApi` implementation for Porkbun.
//
// ## Behavior
//
// - ✅ One HTTP request per trait method
// - ✅ Every request is a POST with the credentials in the JSON body
// - ✅ HTTP timeout from `ProviderConfig::timeout_secs`
// - ✅ Envelope status decides success, not the HTTP status
// - ❌ NO retry logic (a failed attempt is surfaced as-is)
// - ❌ NO caching (Read always goes to the registrar)
// - ❌ NO existence checks before upserts
//
// ## Security Requirements
//
// - API keys NEVER appear in logs or `Debug` output
// - Construction fails fast if a key is empty
//
// ## API Reference
//
// - Porkbun API v3: https://porkbun.com/api/json/v3/documentation
// - Glue: POST `/domain/{createGlue,updateGlue,deleteGlue}/:domain/:subdomain`, `/domain/getGlue/:domain`
// - DNS: POST `/dns/create/:domain`, `/dns/{retrieve,edit,delete}/:domain/:id`
// - Nameservers: POST `/domain/getNs/:domain`, `/domain/updateNs/:domain`

mod envelope;

use std::time::Duration;

use async_trait::async_trait;
use porkbun_core::traits::{DnsRecord, GlueRecord, RegistrarApi};
use porkbun_core::translate::decode_hosts;
use porkbun_core::{Error, ProviderConfig, Result};
use reqwest::Url;
use serde::Serialize;
use serde::de::DeserializeOwned;

use envelope::{
    Authenticated, CreatedRecord, Empty, GlueHosts, IpsPayload, Nameservers, NameserversPayload,
    NoPayload, RetrievedRecords,
};

/// Porkbun API client
///
/// Holds no state besides the credentials and a pooled HTTP client, so
/// clones can be shared freely across concurrent lifecycle calls.
#[derive(Clone)]
pub struct PorkbunClient {
    /// Base URL, e.g. `https://api.porkbun.com/api/json/v3`
    base_url: Url,

    /// ⚠️ NEVER log this value
    api_key: String,

    /// ⚠️ NEVER log this value
    secret_api_key: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API keys
impl std::fmt::Debug for PorkbunClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PorkbunClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<REDACTED>")
            .field("secret_api_key", &"<REDACTED>")
            .finish()
    }
}

impl PorkbunClient {
    /// Create a new client from a validated configuration
    ///
    /// # Errors
    ///
    /// - `Error::Config` if a key is empty, the base URL does not parse or
    ///   the timeout is out of range
    pub fn new(config: ProviderConfig) -> Result<Self> {
        config.validate()?;

        let base_url = Url::parse(&config.base_url).map_err(|e| {
            Error::config(format!("Invalid base URL {:?}: {}", config.base_url, e))
        })?;

        if base_url.cannot_be_a_base() {
            return Err(Error::config(format!(
                "Base URL cannot carry a path: {:?}",
                config.base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            api_key: config.api_key,
            secret_api_key: config.secret_api_key,
            client,
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Build `{base_url}/{segments...}`, percent-encoding each segment
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// POST `payload` with credentials to `segments` and decode the reply
    async fn call<P, T>(&self, segments: &[&str], payload: P) -> Result<T>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments);
        let operation = segments.get(..2).map(|head| head.join("/")).unwrap_or_default();

        tracing::debug!("POST {} ({})", url.path(), operation);

        let body = Authenticated {
            apikey: &self.api_key,
            secretapikey: &self.secret_api_key,
            payload,
        };

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::transport(format!("HTTP request failed: {}", e.without_url())))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Failed to read response: {}", e.without_url())))?;

        tracing::trace!("{} responded {} with {} bytes", operation, status, text.len());

        envelope::decode(status, &text)
    }
}

#[async_trait]
impl RegistrarApi for PorkbunClient {
    async fn create_glue_record(&self, domain: &str, subdomain: &str, ips: &[String]) -> Result<()> {
        let _: Empty = self
            .call(&["domain", "createGlue", domain, subdomain], IpsPayload { ips })
            .await?;
        Ok(())
    }

    async fn update_glue_record(&self, domain: &str, subdomain: &str, ips: &[String]) -> Result<()> {
        let _: Empty = self
            .call(&["domain", "updateGlue", domain, subdomain], IpsPayload { ips })
            .await?;
        Ok(())
    }

    async fn delete_glue_record(&self, domain: &str, subdomain: &str) -> Result<()> {
        let _: Empty = self
            .call(&["domain", "deleteGlue", domain, subdomain], NoPayload {})
            .await?;
        Ok(())
    }

    async fn get_glue_records(&self, domain: &str) -> Result<Vec<GlueRecord>> {
        let body: GlueHosts = self.call(&["domain", "getGlue", domain], NoPayload {}).await?;
        let hosts = body.hosts.unwrap_or_default();
        Ok(decode_hosts(domain, &hosts))
    }

    async fn create_dns_record(&self, domain: &str, record: &DnsRecord) -> Result<String> {
        let body: CreatedRecord = self.call(&["dns", "create", domain], record).await?;
        body.id
            .ok_or_else(|| Error::decode("Create response carries no record id"))
    }

    async fn get_dns_record(&self, domain: &str, id: &str) -> Result<Option<DnsRecord>> {
        let body: RetrievedRecords = self
            .call(&["dns", "retrieve", domain, id], NoPayload {})
            .await?;
        Ok(body.records.unwrap_or_default().into_iter().next())
    }

    async fn update_dns_record(&self, domain: &str, id: &str, record: &DnsRecord) -> Result<()> {
        let _: Empty = self.call(&["dns", "edit", domain, id], record).await?;
        Ok(())
    }

    async fn delete_dns_record(&self, domain: &str, id: &str) -> Result<()> {
        let _: Empty = self
            .call(&["dns", "delete", domain, id], NoPayload {})
            .await?;
        Ok(())
    }

    async fn get_nameservers(&self, domain: &str) -> Result<Vec<String>> {
        let body: Nameservers = self.call(&["domain", "getNs", domain], NoPayload {}).await?;
        Ok(body.ns.unwrap_or_default())
    }

    async fn update_nameservers(&self, domain: &str, nameservers: &[String]) -> Result<()> {
        let _: Empty = self
            .call(
                &["domain", "updateNs", domain],
                NameserversPayload { ns: nameservers },
            )
            .await?;
        Ok(())
    }

    fn registrar_name(&self) -> &'static str {
        "porkbun"
    }
}
