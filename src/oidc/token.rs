//! Access tokens
//!
//! Decodes token endpoint responses and tracks expiry.

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Token response from the token endpoint
#[derive(Debug, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(flatten)]
    pub values: Map<String, Value>,
}

/// OAuth access token
#[derive(Debug, Clone, PartialEq)]
pub struct AccessToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
    pub id_token: Option<String>,
    pub expires: Option<DateTime<Utc>>,
    /// Response fields not covered above, kept verbatim
    pub values: Map<String, Value>,
}

impl TryFrom<TokenResponse> for AccessToken {
    type Error = Error;

    fn try_from(response: TokenResponse) -> Result<Self> {
        let expires = match response.expires_in {
            Some(secs) => Some(
                Duration::try_seconds(secs)
                    .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
                    .ok_or_else(|| {
                        Error::Token(format!("expires_in out of range: {}", secs))
                    })?,
            ),
            None => None,
        };

        Ok(AccessToken {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            token_type: response.token_type,
            scope: response.scope,
            id_token: response.id_token,
            expires,
            values: response.values,
        })
    }
}

impl AccessToken {
    /// Token with no expiry and no refresh token
    pub fn new(access_token: impl Into<String>) -> Self {
        AccessToken {
            access_token: access_token.into(),
            refresh_token: None,
            token_type: None,
            scope: None,
            id_token: None,
            expires: None,
            values: Map::new(),
        }
    }

    /// Decode a token endpoint payload
    pub fn from_response(data: Value) -> Result<Self> {
        let response: TokenResponse = serde_json::from_value(data)
            .map_err(|e| Error::Token(format!("Invalid token response: {}", e)))?;

        if response.access_token.is_empty() {
            return Err(Error::Token("Token response has an empty access_token".to_string()));
        }

        AccessToken::try_from(response)
    }

    /// Check whether the token has expired. Tokens without expiry never do.
    pub fn has_expired(&self) -> bool {
        self.has_expired_at(Utc::now())
    }

    fn has_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires {
            Some(expires) => expires <= now,
            None => false,
        }
    }

    /// Check if token can be refreshed
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_response_keeps_extra_fields() {
        let token = AccessToken::from_response(json!({
            "access_token": "at",
            "refresh_token": "rt",
            "token_type": "Bearer",
            "expires_in": 3600,
            "id_token": "eyJ",
            "session_state": "s1"
        }))
        .unwrap();

        assert_eq!(token.access_token, "at");
        assert_eq!(token.id_token.as_deref(), Some("eyJ"));
        assert_eq!(token.values.get("session_state"), Some(&json!("s1")));
        assert!(!token.values.contains_key("access_token"));
        assert!(token.can_refresh());
        assert!(!token.has_expired());
    }

    #[test]
    fn test_from_response_rejects_missing_access_token() {
        let err = AccessToken::from_response(json!({ "token_type": "Bearer" })).unwrap_err();
        assert!(matches!(err, Error::Token(_)));

        let err = AccessToken::from_response(json!({ "access_token": "" })).unwrap_err();
        assert!(matches!(err, Error::Token(_)));
    }

    #[test]
    fn test_from_response_rejects_out_of_range_expiry() {
        let err = AccessToken::from_response(json!({
            "access_token": "at",
            "expires_in": i64::MAX
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Token(_)));

        let err = AccessToken::from_response(json!({
            "access_token": "at",
            "expires_in": i64::MIN
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Token(_)));
    }

    #[test]
    fn test_negative_expiry_is_already_expired() {
        let token = AccessToken::from_response(json!({
            "access_token": "at",
            "expires_in": -60
        }))
        .unwrap();
        assert!(token.has_expired());
    }

    #[test]
    fn test_expiry() {
        let mut token = AccessToken::new("at");
        assert!(!token.has_expired());
        assert!(!token.can_refresh());

        let now = Utc::now();
        token.expires = Some(now - Duration::seconds(100));
        assert!(token.has_expired_at(now));

        token.expires = Some(now + Duration::seconds(100));
        assert!(!token.has_expired_at(now));
    }
}
