//! HTTP middleware for bearer token injection
//!
//! Implements `reqwest-middleware::Middleware`. Requests that carry an
//! [`AccessToken`] in their extensions get an `Authorization: Bearer` header;
//! all other requests pass through untouched.

use crate::oidc::AccessToken;
use async_trait::async_trait;
use http::Extensions;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next, Result as MiddlewareResult};
use tracing::debug;

/// Middleware that authorizes requests with the access token attached to them
#[derive(Debug, Clone, Copy, Default)]
pub struct BearerAuthorization;

#[async_trait]
impl Middleware for BearerAuthorization {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> MiddlewareResult<Response> {
        if let Some(token) = extensions.get::<AccessToken>() {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.access_token))
                .map_err(|e| {
                    reqwest_middleware::Error::Middleware(anyhow::anyhow!("Invalid token: {}", e))
                })?;
            value.set_sensitive(true);

            req.headers_mut().insert(AUTHORIZATION, value);
            debug!("Injected Authorization header with bearer token");
        }

        next.run(req, extensions).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest_middleware::ClientBuilder;

    #[tokio::test]
    async fn test_middleware_injects_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/me")
            .match_header("authorization", "Bearer abc")
            .with_status(200)
            .create_async()
            .await;

        let client = ClientBuilder::new(reqwest::Client::new())
            .with(BearerAuthorization)
            .build();

        let response = client
            .get(format!("{}/me", server.url()))
            .with_extension(AccessToken::new("abc"))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_middleware_skips_requests_without_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/public")
            .match_header("authorization", mockito::Matcher::Missing)
            .with_status(204)
            .create_async()
            .await;

        let client = ClientBuilder::new(reqwest::Client::new())
            .with(BearerAuthorization)
            .build();

        let response = client
            .get(format!("{}/public", server.url()))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 204);
        mock.assert_async().await;
    }
}
