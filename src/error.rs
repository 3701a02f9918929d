//! Error types for the Ozwillo OAuth 2.0 client

use serde_json::Value;
use thiserror::Error;

/// Error reported by the identity provider inside a response body.
///
/// Carries the provider's message and numeric code (0 when the provider did
/// not send one) along with the full decoded payload for diagnostics.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct IdentityProviderError {
    pub message: String,
    pub code: i64,
    pub response: Value,
}

impl IdentityProviderError {
    pub fn new(message: impl Into<String>, code: i64, response: Value) -> Self {
        Self {
            message: message.into(),
            code,
            response,
        }
    }
}

/// Failure to read a claim from a userinfo document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UserInfoError {
    #[error("Missing claim: {0}")]
    MissingClaim(&'static str),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Identity provider error: {0}")]
    IdentityProvider(#[from] IdentityProviderError),

    #[error("User info error: {0}")]
    UserInfo(#[from] UserInfoError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("OAuth callback error: {0}")]
    Callback(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;
