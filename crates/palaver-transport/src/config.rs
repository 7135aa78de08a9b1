//! Transport configuration.

use std::env;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the HTTP transport adapter.
#[derive(Debug, Clone)]
pub struct ChatApiConfig {
    /// Base URL of the conversation service, e.g. `http://localhost:5000/api`.
    pub base_url: String,
    /// Optional bearer token attached to every request.
    pub auth_token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ChatApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ChatApiConfig {
    /// Creates a configuration for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Sets the bearer token attached to every request.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Loads configuration from environment variables.
    ///
    /// `PALAVER_API_URL` overrides the base URL and `PALAVER_API_TOKEN`
    /// supplies the bearer token; both fall back to defaults when unset or
    /// blank.
    pub fn from_env() -> Self {
        let base_url = env::var("PALAVER_API_URL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let auth_token = env::var("PALAVER_API_TOKEN")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Self {
            base_url,
            auth_token,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ChatApiConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.auth_token.is_none());
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_builder_chain() {
        let config = ChatApiConfig::new("https://chat.example.com/api")
            .with_auth_token("secret")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.base_url, "https://chat.example.com/api");
        assert_eq!(config.auth_token.as_deref(), Some("secret"));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
