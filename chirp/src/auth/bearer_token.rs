use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use tracing::debug;

use crate::{
    config::ClientConfig,
    error::{Error, NormalizeError},
    response::ErrorPayload,
};

/// The provider's token payload, kept verbatim. Only `access_token` feeds
/// the authorization header, but callers occasionally want to inspect the
/// rest.
#[derive(Deserialize, Clone, Debug)]
pub struct TokenPayload {
    pub token_type: Box<str>,
    pub access_token: Box<str>,
}

/// An app-only bearer token obtained through the OAuth2 client-credentials
/// exchange, which can authenticate requests made on behalf of the
/// application. It can read public tweets but cannot act as a user.
///
/// A token lives exactly as long as the client that acquired it; there is no
/// refresh-on-expiry, and re-authenticating means constructing a new client.
#[derive(Clone, Debug)]
pub struct BearerToken {
    payload: TokenPayload,
    auth_header: Box<str>,
}

impl BearerToken {
    /// Exchanges the configured key/secret for a bearer token with a single
    /// POST to the token endpoint. Not retried: a failure here is fatal to
    /// client construction.
    pub(crate) async fn request(
        http: &reqwest::Client,
        config: &ClientConfig,
    ) -> Result<Self, Error> {
        debug!(url = %config.token_url, "requesting bearer token");

        let response = http
            .post(&config.token_url)
            .header(AUTHORIZATION, basic_credentials(&config.api_key, &config.api_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(Error::Connection)?;

        let status = response.status();
        let body = response.bytes().await.map_err(Error::Connection)?;

        if !status.is_success() {
            return Err(Error::Provider {
                status,
                message: ErrorPayload::extract_message(&body),
            });
        }

        let payload: TokenPayload = serde_json::from_slice(&body)
            .map_err(|err| Error::Normalize(NormalizeError::Json(err)))?;

        if !payload.token_type.eq_ignore_ascii_case("bearer") {
            return Err(Error::Provider {
                status,
                message: format!("unexpected token_type {:?}", payload.token_type).into_boxed_str(),
            });
        }

        Ok(Self::from_payload(payload))
    }

    fn from_payload(payload: TokenPayload) -> Self {
        // Create the Authorization header ahead-of-time, since it will be
        // the same for every request using this token.
        let auth_header = {
            const PREFIX: &str = "Bearer ";
            let mut buf = String::with_capacity(PREFIX.len() + payload.access_token.len());
            buf.push_str(PREFIX);
            buf.push_str(&payload.access_token);
            buf.into_boxed_str()
        };

        Self {
            payload,
            auth_header,
        }
    }

    /// The provider's token payload as it was returned by the token
    /// endpoint.
    pub fn payload(&self) -> &TokenPayload {
        &self.payload
    }

    pub(crate) fn auth_header(&self) -> &str {
        &self.auth_header
    }
}

/// `Basic` credentials for the token exchange: the key and secret are
/// percent-encoded, joined with `:` and base64-encoded.
fn basic_credentials(api_key: &str, api_secret: &str) -> String {
    let pair = format!(
        "{}:{}",
        urlencoding::encode(api_key),
        urlencoding::encode(api_secret)
    );
    format!("Basic {}", BASE64.encode(pair))
}
