//! Client configuration: target host and API key.
//!
//! Set once when the client is constructed and read-only afterwards.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ApiError, Result};

pub const DEFAULT_HOST: &str = "api.littlesis.org";

/// Connection settings for one client instance.
///
/// `api_key` is optional here so a client can be constructed before a key is
/// known; building any request without one fails with `Authentication`.
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Bare host (`api.littlesis.org`) or base URL (`http://127.0.0.1:3000`).
    pub host: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            api_key: None,
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("api_key", &self.api_key.as_ref().map(|_| "REDACTED"))
            .finish()
    }
}

impl ClientConfig {
    pub fn new(host: &str, api_key: Option<&str>) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
            api_key: api_key.map(str::to_string),
        }
    }

    /// Read `LITTLESIS_HOST` and `LITTLESIS_API_KEY` from the environment.
    ///
    /// The host falls back to [`DEFAULT_HOST`]; a missing key is reported
    /// later, when the first request is built.
    pub fn from_env() -> Self {
        let host = std::env::var("LITTLESIS_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let api_key = std::env::var("LITTLESIS_API_KEY")
            .ok()
            .filter(|key| !key.is_empty());
        Self::new(&host, api_key.as_deref())
    }

    /// The base URL requests are resolved against, always ending in `/`.
    pub fn base_url(&self) -> Result<Url> {
        let host = self.host.trim_end_matches('/');
        let raw = if host.contains("://") {
            format!("{host}/")
        } else {
            format!("http://{host}/")
        };
        Url::parse(&raw).map_err(|e| ApiError::Config(format!("invalid host '{}': {e}", self.host)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_gets_http_scheme() {
        let config = ClientConfig::new("api.littlesis.org", Some("k"));
        assert_eq!(config.base_url().unwrap().as_str(), "http://api.littlesis.org/");
    }

    #[test]
    fn full_base_url_is_kept_and_trailing_slash_stripped() {
        let config = ClientConfig::new("http://127.0.0.1:3000/", Some("k"));
        assert_eq!(config.host, "http://127.0.0.1:3000");
        assert_eq!(config.base_url().unwrap().as_str(), "http://127.0.0.1:3000/");
    }

    #[test]
    fn unparsable_host_is_a_config_error() {
        let config = ClientConfig::new("http://exa mple.org", Some("k"));
        assert!(matches!(config.base_url(), Err(ApiError::Config(_))));
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = ClientConfig::new("api.littlesis.org", Some("secret"));
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn default_targets_public_host_without_key() {
        let config = ClientConfig::default();
        assert_eq!(config.host, DEFAULT_HOST);
        assert!(config.api_key.is_none());
    }
}
