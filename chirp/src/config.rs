use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Configuration for an [`AsyncClient`](crate::client::AsyncClient).
///
/// Only the key/secret pair is mandatory; every other field has a default
/// and is mostly overridden to point the client at a stub server in tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Application API key for the client-credentials exchange.
    pub api_key: String,

    /// Application API secret for the client-credentials exchange.
    pub api_secret: String,

    /// Base URL for the v1.1 data endpoints (default:
    /// `https://api.twitter.com/1.1`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// URL of the OAuth2 token endpoint (default:
    /// `https://api.twitter.com/oauth2/token`).
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Result count requested when the caller does not supply one. The
    /// provider caps a page at 100; this crate does not clamp.
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Connect/read timeout for every request.
    #[serde(default = "default_timeout", with = "duration_secs")]
    pub timeout: Duration,

    /// Retry behaviour for transient failures.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl ClientConfig {
    /// Returns a config with the given credentials and every other field at
    /// its default.
    pub fn new<K, S>(api_key: K, api_secret: S) -> Self
    where
        K: Into<String>,
        S: Into<String>,
    {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            base_url: default_base_url(),
            token_url: default_token_url(),
            default_limit: default_limit(),
            timeout: default_timeout(),
            retry: RetryConfig::default(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.api_key.is_empty() {
            return Err(Error::Config("api_key must not be empty".into()));
        }
        if self.api_secret.is_empty() {
            return Err(Error::Config("api_secret must not be empty".into()));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "https://api.twitter.com/1.1".into()
}

fn default_token_url() -> String {
    "https://api.twitter.com/oauth2/token".into()
}

fn default_limit() -> u32 {
    30
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

/// Retry behaviour for the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Number of retries after the initial attempt.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Base factor for the exponential backoff, in seconds. The delay before
    /// retry `n` is `backoff_factor * 2^(n - 1)`.
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,

    /// Status codes considered transient. Anything else, 4xx in particular,
    /// is an application error and is returned immediately.
    #[serde(default = "default_status_forcelist")]
    pub status_forcelist: Vec<u16>,
}

impl RetryConfig {
    pub(crate) fn should_retry_status(&self, status: StatusCode) -> bool {
        self.status_forcelist.contains(&status.as_u16())
    }

    /// Delay before retry number `attempt` (1-based).
    pub(crate) fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let secs = self.backoff_factor * f64::from(1u32 << exp);
        Duration::from_secs_f64(secs.max(0.0))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            backoff_factor: default_backoff_factor(),
            status_forcelist: default_status_forcelist(),
        }
    }
}

fn default_retries() -> u32 {
    5
}

fn default_backoff_factor() -> f64 {
    1.0
}

fn default_status_forcelist() -> Vec<u16> {
    vec![502, 503, 504]
}
