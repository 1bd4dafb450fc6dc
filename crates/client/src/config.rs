//! Client configuration from the environment.

use std::time::Duration;

use thiserror::Error;

use ledgerdesk_core::CompanyId;

pub const API_URL_VAR: &str = "LEDGERDESK_API_URL";
pub const TIMEOUT_VAR: &str = "LEDGERDESK_TIMEOUT_SECS";
pub const TOKEN_VAR: &str = "LEDGERDESK_TOKEN";
pub const COMPANY_VAR: &str = "LEDGERDESK_COMPANY_ID";

const DEFAULT_API_URL: &str = "http://localhost:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("LEDGERDESK_TIMEOUT_SECS must be a positive number of seconds, got {0:?}")]
    InvalidTimeout(String),

    #[error("LEDGERDESK_API_URL must not be empty")]
    EmptyApiUrl,
}

#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the accounting API, without trailing slash.
    pub api_base_url: String,
    pub request_timeout: Duration,
    /// Bearer token to seed the session with.
    pub token: Option<String>,
    /// Company scope for listings.
    pub company_id: Option<CompanyId>,
}

impl core::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_base_url", &self.api_base_url)
            .field("request_timeout", &self.request_timeout)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("company_id", &self.company_id)
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            token: None,
            company_id: None,
        }
    }
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_base_url = match lookup(API_URL_VAR) {
            None => DEFAULT_API_URL.to_string(),
            Some(url) => {
                let url = url.trim().trim_end_matches('/').to_string();
                if url.is_empty() {
                    return Err(ConfigError::EmptyApiUrl);
                }
                url
            }
        };

        let request_timeout = match non_empty(TIMEOUT_VAR) {
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
        };

        Ok(Self {
            api_base_url,
            request_timeout,
            token: non_empty(TOKEN_VAR),
            company_id: non_empty(COMPANY_VAR).map(CompanyId::new),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:3000");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.token.is_none());
        assert!(config.company_id.is_none());
    }

    #[test]
    fn reads_and_normalizes_values() {
        let config = ClientConfig::from_lookup(lookup(&[
            (API_URL_VAR, "https://books.example.com/api/"),
            (TIMEOUT_VAR, "5"),
            (TOKEN_VAR, "tok"),
            (COMPANY_VAR, "co-1"),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url, "https://books.example.com/api");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.token.as_deref(), Some("tok"));
        assert_eq!(config.company_id, Some(CompanyId::new("co-1")));
    }

    #[test]
    fn blank_optional_values_are_unset() {
        let config = ClientConfig::from_lookup(lookup(&[(TOKEN_VAR, "  "), (TIMEOUT_VAR, "")])).unwrap();
        assert!(config.token.is_none());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn rejects_bad_timeout_and_empty_url() {
        assert_eq!(
            ClientConfig::from_lookup(lookup(&[(TIMEOUT_VAR, "soon")])).unwrap_err(),
            ConfigError::InvalidTimeout("soon".to_string())
        );
        assert_eq!(
            ClientConfig::from_lookup(lookup(&[(TIMEOUT_VAR, "0")])).unwrap_err(),
            ConfigError::InvalidTimeout("0".to_string())
        );
        assert_eq!(
            ClientConfig::from_lookup(lookup(&[(API_URL_VAR, " / ")])).unwrap_err(),
            ConfigError::EmptyApiUrl
        );
    }

    #[test]
    fn debug_redacts_token() {
        let mut config = ClientConfig::new("http://x/");
        config.token = Some("secret".to_string());
        let shown = format!("{config:?}");
        assert!(!shown.contains("secret"));
        assert!(shown.contains("http://x\""));
    }
}
