//! Generic OAuth 2.0 client
//!
//! Drives the authorization code flow for any [`Provider`]: builds the
//! authorization URL, exchanges codes and refresh tokens at the token
//! endpoint and fetches the userinfo document. Holds no mutable state, so
//! one client can serve concurrent flows.

use super::{AccessToken, AuthorizationParams, Provider};
use crate::error::{Error, Result};
use crate::middleware::BearerAuthorization;
use reqwest::header::ACCEPT;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde_json::{Map, Value};
use url::Url;

const STATE_LENGTH: usize = 32;

/// Registered client settings, fixed for the lifetime of an [`OAuth2Client`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
}

impl ClientCredentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: Option<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            redirect_uri: redirect_uri.into(),
        }
    }
}

/// A ready-to-follow authorization redirect
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: Url,
    /// Must come back unchanged on the callback
    pub state: String,
    pub nonce: Option<String>,
}

/// OAuth 2.0 client bound to a single provider
pub struct OAuth2Client<P: Provider> {
    credentials: ClientCredentials,
    provider: P,
    http: ClientWithMiddleware,
}

impl<P: Provider> OAuth2Client<P> {
    /// Create a new client with a default HTTP stack
    pub fn new(credentials: ClientCredentials, provider: P) -> Self {
        Self::with_http_client(credentials, provider, reqwest::Client::new())
    }

    /// Create a new client on top of an existing `reqwest` client
    pub fn with_http_client(
        credentials: ClientCredentials,
        provider: P,
        client: reqwest::Client,
    ) -> Self {
        let http = ClientBuilder::new(client).with(BearerAuthorization).build();

        Self {
            credentials,
            provider,
            http,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn credentials(&self) -> &ClientCredentials {
        &self.credentials
    }

    /// Final authorization parameters for the given caller options.
    ///
    /// The provider adjusts the options first; the standard parameters are
    /// filled in afterwards without overriding anything the caller or
    /// provider already set.
    pub fn authorization_parameters(&self, options: AuthorizationParams) -> AuthorizationParams {
        let mut params = self.provider.authorization_parameters(options);

        if params.is_blank("state") {
            params.set("state", random_alphanumeric(STATE_LENGTH));
        }

        if params.scopes().is_empty() {
            params.set_scopes(self.provider.default_scopes());
        }

        if params.get("response_type").is_none() {
            params.set("response_type", "code");
        }

        if params.get("redirect_uri").is_none() {
            params.set("redirect_uri", self.credentials.redirect_uri.as_str());
        }

        params.set("client_id", self.credentials.client_id.as_str());

        params
    }

    /// Build authorization URL for the given caller options
    pub fn authorization_url(&self, options: AuthorizationParams) -> Result<AuthorizationRequest> {
        let params = self.authorization_parameters(options);

        let mut url = Url::parse(self.provider.base_authorization_url())?;
        params.append_to(&mut url, self.provider.scope_separator());

        let state = params.get("state").unwrap_or_default().to_string();
        let nonce = params.get("nonce").map(String::from);

        tracing::debug!("Built authorization URL for {}", self.provider.base_authorization_url());

        Ok(AuthorizationRequest { url, state, nonce })
    }

    /// Exchange authorization code for tokens
    pub async fn exchange_code(&self, code: &str, code_verifier: Option<&str>) -> Result<AccessToken> {
        let mut params = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.credentials.redirect_uri.as_str()),
        ];

        if let Some(verifier) = code_verifier {
            params.push(("code_verifier", verifier));
        }

        tracing::debug!("Exchanging authorization code for tokens");
        self.request_token(params).await
    }

    /// Obtain a new access token using a refresh token
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<AccessToken> {
        let params = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];

        tracing::debug!("Refreshing access token");
        self.request_token(params).await
    }

    /// Fetch the userinfo document and map it to the provider's resource owner
    pub async fn resource_owner(&self, token: &AccessToken) -> Result<P::ResourceOwner> {
        let claims = self.fetch_resource_owner_details(token).await?;
        self.provider.create_resource_owner(claims, token)
    }

    /// Fetch the raw userinfo claims
    pub async fn fetch_resource_owner_details(&self, token: &AccessToken) -> Result<Map<String, Value>> {
        let url = self.provider.resource_owner_details_url(token);

        tracing::debug!("Fetching resource owner details from {}", url);

        let response = self
            .http
            .get(url.as_str())
            .header(ACCEPT, "application/json")
            .with_extension(token.clone())
            .send()
            .await?;

        match self.parse_response(response).await? {
            Value::Object(claims) => Ok(claims),
            other => Err(Error::UnexpectedResponse(format!(
                "Userinfo response is not a JSON object: {}",
                other
            ))),
        }
    }

    async fn request_token<'a>(&'a self, mut params: Vec<(&'a str, &'a str)>) -> Result<AccessToken> {
        params.push(("client_id", self.credentials.client_id.as_str()));

        if let Some(ref secret) = self.credentials.client_secret {
            params.push(("client_secret", secret.as_str()));
        }

        let response = self
            .http
            .post(self.provider.base_access_token_url())
            .header(ACCEPT, "application/json")
            .form(&params)
            .send()
            .await?;

        let data = self.parse_response(response).await?;
        AccessToken::from_response(data)
    }

    /// Decode a JSON body and let the provider classify errors
    async fn parse_response(&self, response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let body = response.text().await?;

        let data: Value = serde_json::from_str(&body).map_err(|e| {
            Error::UnexpectedResponse(format!(
                "Failed to parse response body (status {}): {}",
                status, e
            ))
        })?;

        self.provider.check_response(status, &data)?;

        if !status.is_success() {
            return Err(Error::UnexpectedResponse(format!(
                "Request failed with status {}: {}",
                status, body
            )));
        }

        Ok(data)
    }
}

/// Random alphanumeric token for state and nonce values
pub(crate) fn random_alphanumeric(len: usize) -> String {
    use rand::distributions::Alphanumeric;
    use rand::Rng;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
