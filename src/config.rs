//! Client configuration
//!
//! Settings for talking to a collection API, loaded from a YAML or JSON file:
//!
//! ```yaml
//! base_url: https://company.pipedrive.com/api/v1
//! api_token: 0123abcd
//! http:
//!   timeout_secs: 30
//!   max_retries: 3
//!   backoff: exponential
//!   requests_per_second: 10
//! paging:
//!   page_size: 500
//! ```

use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClient, HttpClientConfig, RateLimiterConfig};
use crate::pagination::PageOptions;
use crate::types::BackoffType;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable consulted when the config carries no API token
pub const API_TOKEN_ENV: &str = "PIPEDRIVE_API_TOKEN";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL page targets are resolved against
    #[serde(default)]
    pub base_url: String,

    /// API token sent as the `api_token` query parameter
    #[serde(default, skip_serializing)]
    pub api_token: Option<String>,

    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpSettings,

    /// Paging defaults
    #[serde(default)]
    pub paging: PageOptions,
}

/// HTTP transport settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum retries per request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff strategy between retries
    #[serde(default)]
    pub backoff: BackoffType,

    /// Initial backoff in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Client-side rate limit (0 disables it)
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// Burst size for the rate limiter
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    100
}

fn default_max_backoff_ms() -> u64 {
    60_000
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst_size() -> u32 {
    10
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            backoff: BackoffType::default(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            requests_per_second: default_requests_per_second(),
            burst_size: default_burst_size(),
        }
    }
}

impl ClientConfig {
    /// Create a config for a base URL with default settings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Parse a config from YAML (JSON is valid YAML)
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse a config from JSON
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Fill the API token from the environment if the config has none
    #[must_use]
    pub fn with_env_token(mut self) -> Self {
        if self.api_token.is_none() {
            self.api_token = std::env::var(API_TOKEN_ENV)
                .ok()
                .filter(|token| !token.is_empty());
        }
        self
    }

    /// Check the config is usable
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::missing_field("base_url"));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| Error::invalid_value("base_url", e.to_string()))?;

        if self.paging.page_size == Some(0) {
            return Err(Error::invalid_value(
                "paging.page_size",
                "must be greater than 0",
            ));
        }
        if self.paging.page_count == Some(0) {
            return Err(Error::invalid_value(
                "paging.page_count",
                "must be greater than 0",
            ));
        }
        if self.http.timeout_secs == 0 {
            return Err(Error::invalid_value(
                "http.timeout_secs",
                "must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Transport configuration derived from these settings
    pub fn http_client_config(&self) -> HttpClientConfig {
        let http = &self.http;
        let mut builder = HttpClientConfig::builder()
            .base_url(self.base_url.clone())
            .timeout(Duration::from_secs(http.timeout_secs))
            .max_retries(http.max_retries)
            .backoff(
                http.backoff,
                Duration::from_millis(http.initial_backoff_ms),
                Duration::from_millis(http.max_backoff_ms),
            );

        builder = if http.requests_per_second == 0 {
            builder.no_rate_limit()
        } else {
            builder.rate_limit(RateLimiterConfig::new(
                http.requests_per_second,
                http.burst_size,
            ))
        };

        if let Some(token) = &self.api_token {
            builder = builder.api_token(token.clone());
        }
        builder.build()
    }

    /// Validate and build the HTTP client
    pub fn http_client(&self) -> Result<HttpClient> {
        self.validate()?;
        HttpClient::with_config(self.http_client_config())
    }
}

/// Load a config file, choosing the parser from the extension
pub fn load_config(path: impl AsRef<Path>) -> Result<ClientConfig> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => ClientConfig::from_json_str(&content),
        _ => ClientConfig::from_yaml_str(&content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const YAML: &str = r"
base_url: https://company.pipedrive.com/api/v1
api_token: abc123
http:
  max_retries: 5
  backoff: linear
  requests_per_second: 0
paging:
  page_size: 250
  page_count: 4
";

    #[test]
    fn test_parse_yaml() {
        let config = ClientConfig::from_yaml_str(YAML).unwrap();

        assert_eq!(config.base_url, "https://company.pipedrive.com/api/v1");
        assert_eq!(config.api_token.as_deref(), Some("abc123"));
        assert_eq!(config.http.max_retries, 5);
        assert_eq!(config.http.backoff, BackoffType::Linear);
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.paging.page_size, Some(250));
        assert_eq!(config.paging.page_count, Some(4));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_json_defaults() {
        let config = ClientConfig::from_json_str(r#"{"base_url": "https://api.example.com"}"#)
            .unwrap();

        assert_eq!(config.http, HttpSettings::default());
        assert_eq!(config.paging, PageOptions::default());
        assert_eq!(config.paging.effective_page_size(), 100);
    }

    #[test]
    fn test_validate_missing_base_url() {
        let err = ClientConfig::default().validate().unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { ref field } if field == "base_url"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let err = ClientConfig::new("not a url").validate().unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { ref field, .. } if field == "base_url"));

        let mut config = ClientConfig::new("https://api.example.com");
        config.paging.page_size = Some(0);
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfigValue { ref field, .. } if field == "paging.page_size"
        ));
    }

    #[test]
    fn test_http_client_config_mapping() {
        let config = ClientConfig::from_yaml_str(YAML).unwrap();
        let http = config.http_client_config();

        assert_eq!(
            http.base_url.as_deref(),
            Some("https://company.pipedrive.com/api/v1")
        );
        assert_eq!(http.max_retries, 5);
        assert_eq!(http.backoff_type, BackoffType::Linear);
        assert!(http.rate_limit.is_none());
        assert_eq!(
            http.default_query,
            vec![("api_token".to_string(), "abc123".to_string())]
        );
    }

    #[test]
    fn test_api_token_not_serialized() {
        let config = ClientConfig::from_yaml_str(YAML).unwrap();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("abc123"));
    }

    #[test]
    fn test_load_config_by_extension() {
        let mut yaml = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        yaml.write_all(YAML.as_bytes()).unwrap();
        let config = load_config(yaml.path()).unwrap();
        assert_eq!(config.paging.page_size, Some(250));

        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        json.write_all(br#"{"base_url": "https://api.example.com", "paging": {"page_size": 5}}"#)
            .unwrap();
        let config = load_config(json.path()).unwrap();
        assert_eq!(config.paging.page_size, Some(5));
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }
}
