//! Generic OAuth 2.0 / OpenID Connect client

pub mod callback;
pub mod client;
pub mod params;
pub mod provider;
pub mod token;

pub use client::{AuthorizationRequest, ClientCredentials, OAuth2Client};
pub use params::AuthorizationParams;
pub use provider::{Provider, ResourceOwner};
pub use token::{AccessToken, TokenResponse};
