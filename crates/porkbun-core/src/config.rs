//! Configuration types for the Porkbun provider
//!
//! The provider configuration is built once (by the host) and passed into
//! the wire client at construction time. Nothing here is global.

use serde::{Deserialize, Serialize};

/// Porkbun API v3 base URL
pub const DEFAULT_BASE_URL: &str = "https://api.porkbun.com/api/json/v3";

/// Provider-wide client configuration
///
/// # Security
///
/// The Debug implementation does NOT expose the API keys.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL every request path is appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Porkbun API key
    /// ⚠️ NEVER log this value
    pub api_key: String,

    /// Porkbun secret API key
    /// ⚠️ NEVER log this value
    pub secret_api_key: String,

    /// Per-request timeout (in seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

// Custom Debug implementation that hides the credentials
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<REDACTED>")
            .field("secret_api_key", &"<REDACTED>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ProviderConfig {
    /// Create a configuration against the public Porkbun endpoint
    pub fn new(api_key: impl Into<String>, secret_api_key: impl Into<String>) -> Self {
        Self {
            base_url: default_base_url(),
            api_key: api_key.into(),
            secret_api_key: secret_api_key.into(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Point the configuration at another base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_key.is_empty() {
            return Err(crate::Error::config("Porkbun API key cannot be empty"));
        }

        if self.secret_api_key.is_empty() {
            return Err(crate::Error::config(
                "Porkbun secret API key cannot be empty",
            ));
        }

        if !self.base_url.starts_with("https://") && !self.base_url.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "Base URL must use HTTP or HTTPS scheme. Got: {}",
                self.base_url
            )));
        }

        if !(1..=300).contains(&self.timeout_secs) {
            return Err(crate::Error::config(format!(
                "Request timeout must be between 1 and 300 seconds. Got: {}",
                self.timeout_secs
            )));
        }

        Ok(())
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
