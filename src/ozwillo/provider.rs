//! Ozwillo provider
//!
//! Endpoints, authorization request defaults and error translation for the
//! Ozwillo OpenID Connect provider.

use super::OzwilloUser;
use crate::error::{IdentityProviderError, Result};
use crate::oidc::client::random_alphanumeric;
use crate::oidc::{AccessToken, AuthorizationParams, Provider};
use http::StatusCode;
use serde_json::{Map, Value};

pub const AUTHORIZATION_URL: &str = "https://accounts.ozwillo-preprod.eu/a/auth";
pub const TOKEN_URL: &str = "https://accounts.ozwillo-preprod.eu/a/token";
pub const USERINFO_URL: &str = "https://accounts.ozwillo-preprod.eu/a/userinfo";

/// Scopes always requested. "openid" must stay first.
pub const DEFAULT_SCOPES: [&str; 6] = [
    "openid",
    "email",
    "profile",
    "address",
    "phone",
    "offline_access",
];

const NONCE_PREFIX: &str = "oz-";
const NONCE_LENGTH: usize = 20;

/// Optional authorization parameters that are dropped unless the caller set them
const OPTIONAL_PARAMETERS: [&str; 7] = [
    "code_challenge",
    "code_challenge_method",
    "prompt",
    "id_token_hint",
    "max_age",
    "claims",
    "ui_locales",
];

/// Ozwillo OpenID Connect provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ozwillo {
    scopes: Vec<String>,
}

impl Ozwillo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider requesting `scopes` on top of the defaults
    pub fn with_scopes<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scopes: scopes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Defaults, then configured scopes, then requested ones, first occurrence wins
    pub fn effective_scopes(&self, requested: &[String]) -> Vec<String> {
        let candidates = DEFAULT_SCOPES
            .iter()
            .map(|s| s.to_string())
            .chain(self.scopes.iter().cloned())
            .chain(requested.iter().cloned());

        let mut scopes: Vec<String> = Vec::new();
        for scope in candidates {
            if !scope.is_empty() && !scopes.contains(&scope) {
                scopes.push(scope);
            }
        }
        scopes
    }
}

impl Provider for Ozwillo {
    type ResourceOwner = OzwilloUser;

    fn base_authorization_url(&self) -> &str {
        AUTHORIZATION_URL
    }

    fn base_access_token_url(&self) -> &str {
        TOKEN_URL
    }

    fn resource_owner_details_url(&self, _token: &AccessToken) -> String {
        USERINFO_URL.to_string()
    }

    fn default_scopes(&self) -> Vec<String> {
        DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect()
    }

    fn scope_separator(&self) -> &str {
        " "
    }

    fn authorization_parameters(&self, mut params: AuthorizationParams) -> AuthorizationParams {
        params.set("response_mode", "query");
        params.set("nonce", generate_nonce());

        for key in OPTIONAL_PARAMETERS {
            if params.is_blank(key) {
                params.omit(key);
            }
        }

        // A challenge and a method must never be sent together
        if !params.is_blank("code_challenge") {
            params.omit("code_challenge_method");
        }

        let scopes = self.effective_scopes(params.scopes());
        tracing::debug!("Requesting scopes: {}", scopes.join(" "));
        params.set_scopes(scopes);

        params
    }

    fn check_response(
        &self,
        _status: StatusCode,
        data: &Value,
    ) -> std::result::Result<(), IdentityProviderError> {
        let error = match data.get("error") {
            Some(error) if !is_empty(error) => error,
            _ => return Ok(()),
        };

        let (message, code) = match error {
            Value::Object(details) => (
                details.get("message").map(as_text).unwrap_or_default(),
                details.get("code").and_then(as_code).unwrap_or(0),
            ),
            other => (as_text(other), 0),
        };

        tracing::warn!("Ozwillo reported an error (code {}): {}", code, message);
        Err(IdentityProviderError::new(message, code, data.clone()))
    }

    fn create_resource_owner(
        &self,
        claims: Map<String, Value>,
        _token: &AccessToken,
    ) -> Result<OzwilloUser> {
        Ok(OzwilloUser::from_claims(claims)?)
    }
}

fn generate_nonce() -> String {
    format!("{}{}", NONCE_PREFIX, random_alphanumeric(NONCE_LENGTH))
}

/// Falsy JSON values: null, false, 0, "", "0" and empty collections
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn as_code(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
