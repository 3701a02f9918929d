//! Provider hooks
//!
//! A [`Provider`] describes one identity provider: where its endpoints live,
//! how it wants authorization requests shaped, how it reports errors and how
//! its userinfo document maps onto a resource owner. [`OAuth2Client`] calls
//! these hooks and does everything else.
//!
//! [`OAuth2Client`]: super::OAuth2Client

use super::{AccessToken, AuthorizationParams};
use crate::error::{IdentityProviderError, Result};
use http::StatusCode;
use serde_json::{Map, Value};

/// The authenticated user as described by a provider's userinfo endpoint
pub trait ResourceOwner {
    /// Provider-unique identifier of the user
    fn id(&self) -> &str;

    /// All claims, exactly as the provider returned them
    fn to_map(&self) -> &Map<String, Value>;
}

/// Provider-specific behavior plugged into the generic client
pub trait Provider: Send + Sync {
    type ResourceOwner: ResourceOwner;

    fn base_authorization_url(&self) -> &str;

    fn base_access_token_url(&self) -> &str;

    fn resource_owner_details_url(&self, token: &AccessToken) -> String;

    /// Scopes requested when the caller supplies none
    fn default_scopes(&self) -> Vec<String> {
        Vec::new()
    }

    /// Delimiter placed between scopes in the `scope` parameter
    fn scope_separator(&self) -> &str {
        ","
    }

    /// Adjust caller options before the client adds the standard parameters
    fn authorization_parameters(&self, params: AuthorizationParams) -> AuthorizationParams {
        params
    }

    /// Inspect a decoded response body for a provider-reported error
    fn check_response(
        &self,
        status: StatusCode,
        data: &Value,
    ) -> std::result::Result<(), IdentityProviderError> {
        if status.is_client_error() || status.is_server_error() {
            let message = status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string();
            return Err(IdentityProviderError::new(
                message,
                i64::from(status.as_u16()),
                data.clone(),
            ));
        }
        Ok(())
    }

    fn create_resource_owner(
        &self,
        claims: Map<String, Value>,
        token: &AccessToken,
    ) -> Result<Self::ResourceOwner>;
}
