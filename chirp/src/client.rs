use reqwest::{
    header::{HeaderValue, AUTHORIZATION},
    Response,
};
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::{
    auth::BearerToken,
    config::ClientConfig,
    error::{Error, NormalizeError},
    response::{ErrorPayload, SearchResponse},
    tweet::{RawTweet, Tweet},
};

/// Asynchronous client for the provider's read-only v1.1 endpoints.
///
/// Construction eagerly performs the token exchange, so a constructed client
/// always holds a usable bearer token. Nothing is mutated after
/// construction, which makes a shared `&AsyncClient` safe for concurrent
/// read calls.
#[derive(Debug)]
pub struct AsyncClient {
    http: reqwest::Client,
    config: ClientConfig,
    token: BearerToken,
}

impl AsyncClient {
    /// Validates the config, builds the HTTP connection pool and acquires a
    /// bearer token.
    pub async fn new(config: ClientConfig) -> Result<Self, Error> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(Error::Connection)?;

        let token = BearerToken::request(&http, &config).await?;

        Ok(Self {
            http,
            config,
            token,
        })
    }

    /// Convenience constructor from just a key/secret pair, with every other
    /// setting at its default.
    pub async fn connect<K, S>(api_key: K, api_secret: S) -> Result<Self, Error>
    where
        K: Into<String>,
        S: Into<String>,
    {
        Self::new(ClientConfig::new(api_key, api_secret)).await
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn token(&self) -> &BearerToken {
        &self.token
    }

    /// Tweets matching a hashtag, in the order the provider returns them.
    ///
    /// `count` defaults to the configured limit and is passed through
    /// unclamped; the provider enforces its own cap of 100 per page. A
    /// malformed hashtag is reported by the provider as an error status and
    /// surfaces as [`Error::Provider`], never as an empty success.
    pub async fn hashtag_tweets(
        &self,
        hashtag: &str,
        count: Option<u32>,
    ) -> Result<Vec<Tweet>, Error> {
        let count = count.unwrap_or(self.config.default_limit).to_string();
        let params = [
            ("q", hashtag),
            ("count", count.as_str()),
            ("include_entities", "true"),
        ];

        let envelope: SearchResponse = self.get_json("/search/tweets.json", &params).await?;
        normalize(envelope.statuses)
    }

    /// Tweets on a user's timeline, in the order the provider returns them.
    ///
    /// An unknown screen name surfaces as [`Error::Provider`] carrying the
    /// provider's not-found status.
    pub async fn user_timeline(
        &self,
        screen_name: &str,
        count: Option<u32>,
    ) -> Result<Vec<Tweet>, Error> {
        let count = count.unwrap_or(self.config.default_limit).to_string();
        let params = [("screen_name", screen_name), ("count", count.as_str())];

        let raw: Vec<RawTweet> = self
            .get_json("/statuses/user_timeline.json", &params)
            .await?;
        normalize(raw)
    }

    async fn get_json<T>(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);

        let response = self.send_with_retry(&url, params).await?;
        let status = response.status();
        let body = response.bytes().await.map_err(Error::Connection)?;

        if !status.is_success() {
            return Err(Error::Provider {
                status,
                message: ErrorPayload::extract_message(&body),
            });
        }

        serde_json::from_slice(&body).map_err(|err| Error::Normalize(NormalizeError::Json(err)))
    }

    /// Sends a GET request, retrying transient status codes and
    /// connection-level failures with exponential backoff. A response whose
    /// status is not in the force list is returned as-is, 4xx included;
    /// those are application errors, not transient ones.
    async fn send_with_retry(&self, url: &str, params: &[(&str, &str)]) -> Result<Response, Error> {
        let retry = &self.config.retry;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            debug!(%url, attempt, "sending request");

            let request = self
                .http
                .get(url)
                .query(params)
                .header(AUTHORIZATION, self.auth_header_value()?);

            match request.send().await {
                Ok(response)
                    if retry.should_retry_status(response.status())
                        && attempt <= retry.retries =>
                {
                    let delay = retry.backoff_delay(attempt);
                    warn!(
                        status = response.status().as_u16(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "transient provider status, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Ok(response) => return Ok(response),
                Err(err) if err.is_connect() || err.is_timeout() => {
                    if attempt > retry.retries {
                        return Err(Error::Connection(err));
                    }
                    let delay = retry.backoff_delay(attempt);
                    warn!(
                        error = %err,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "connection failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(Error::Connection(err)),
            }
        }
    }

    fn auth_header_value(&self) -> Result<HeaderValue, Error> {
        let mut value = HeaderValue::from_str(self.token.auth_header())
            .map_err(|_| Error::Config("bearer token is not a valid header value".into()))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

fn normalize(raw: Vec<RawTweet>) -> Result<Vec<Tweet>, Error> {
    raw.into_iter()
        .map(|tweet| Tweet::from_raw(tweet).map_err(Error::Normalize))
        .collect()
}

static SHARED: OnceCell<AsyncClient> = OnceCell::const_new();

/// Process-wide client for callers that want construct-once, reuse-everywhere
/// behaviour without threading a handle around. The first caller's config
/// wins; construction is serialized by the cell, so concurrent first calls
/// perform a single token exchange.
pub async fn shared(config: ClientConfig) -> Result<&'static AsyncClient, Error> {
    SHARED.get_or_try_init(|| AsyncClient::new(config)).await
}
