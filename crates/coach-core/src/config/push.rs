//! Push gateway configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Settings for the HTTP push gateway that fans a payload out to a user's
/// registered devices.
#[derive(Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Gateway endpoint. Empty disables real delivery and the server falls
    /// back to a log-only dispatcher.
    #[serde(default)]
    pub gateway_url: String,
    /// Bearer token sent to the gateway.
    #[serde(default)]
    pub api_key: Option<String>,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            gateway_url: String::new(),
            api_key: None,
            request_timeout_seconds: default_timeout(),
        }
    }
}

impl fmt::Debug for PushConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushConfig")
            .field("gateway_url", &self.gateway_url)
            .field("api_key", &mask_secret(self.api_key.as_deref()))
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .finish()
    }
}

/// Debug stand-in for an optional secret.
pub fn mask_secret(secret: Option<&str>) -> Option<&'static str> {
    secret.map(|_| "***")
}

impl PushConfig {
    /// Whether a gateway endpoint is configured.
    pub fn is_configured(&self) -> bool {
        !self.gateway_url.trim().is_empty()
    }
}

fn default_timeout() -> u64 {
    8
}
