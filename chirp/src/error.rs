use std::{error, fmt};

use reqwest::StatusCode;

/// Error returned by every fallible operation in this crate.
///
/// The calling facade is expected to branch on the variant and map it to a
/// transport-appropriate response; this crate never produces a user-facing
/// format itself, only structured error values.
#[derive(Debug)]
pub enum Error {
    /// The provider could not be reached, even after the transport exhausted
    /// its retries.
    Connection(reqwest::Error),
    /// The provider responded with a failure status and (usually) a
    /// structured error payload. The message and status are relayed
    /// verbatim.
    Provider {
        status: StatusCode,
        message: Box<str>,
    },
    /// A success response did not match the expected shape.
    Normalize(NormalizeError),
    /// Missing or invalid credentials, raised before any network call.
    Config(Box<str>),
}

impl Error {
    /// The HTTP status code associated with this error, if there is one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Provider { status, .. } => Some(*status),
            Error::Connection(err) => err.status(),
            Error::Normalize(_) | Error::Config(_) => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Connection(err) => {
                write!(f, "connection to provider failed: {}", err)
            }
            Error::Provider { status, message } => {
                write!(f, "provider error {}: {}", status.as_u16(), message)
            }
            Error::Normalize(err) => {
                write!(f, "malformed provider response: {}", err)
            }
            Error::Config(message) => {
                write!(f, "invalid configuration: {}", message)
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Connection(err) => Some(err),
            Error::Normalize(err) => Some(err),
            Error::Provider { .. } | Error::Config(_) => None,
        }
    }
}

impl From<NormalizeError> for Error {
    fn from(err: NormalizeError) -> Self {
        Error::Normalize(err)
    }
}

/// Why a success response could not be turned into domain values. A whole
/// fetch fails on the first malformed element; a partially-populated list is
/// worse than an explicit failure.
#[derive(Debug)]
pub enum NormalizeError {
    /// The body did not deserialize into the expected shape.
    Json(serde_json::Error),
    /// A `created_at` field did not match the provider's fixed timestamp
    /// format.
    Timestamp(chrono::ParseError),
}

impl fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeError::Json(err) => {
                write!(f, "unexpected response shape: {}", err)
            }
            NormalizeError::Timestamp(err) => {
                write!(f, "unparseable created_at timestamp: {}", err)
            }
        }
    }
}

impl error::Error for NormalizeError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            NormalizeError::Json(err) => Some(err),
            NormalizeError::Timestamp(err) => Some(err),
        }
    }
}
