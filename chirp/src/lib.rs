pub mod auth;
pub mod client;
pub mod config;
pub mod error;
mod response;
pub mod tweet;

pub use auth::BearerToken;
pub use client::{shared, AsyncClient};
pub use config::{ClientConfig, RetryConfig};
pub use error::{Error, NormalizeError};
pub use tweet::{Account, Tweet};
