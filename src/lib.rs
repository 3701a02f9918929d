//! Ozwillo OAuth 2.0 Library
//!
//! OpenID Connect provider for Ozwillo, plugged into a small generic
//! OAuth 2.0 client.
//!
//! ```no_run
//! use oauth2_ozwillo::oidc::{AuthorizationParams, ClientCredentials, OAuth2Client};
//! use oauth2_ozwillo::ozwillo::Ozwillo;
//!
//! # async fn run() -> oauth2_ozwillo::error::Result<()> {
//! let client = OAuth2Client::new(
//!     ClientCredentials::new("client-id", Some("secret".to_string()), "http://localhost:8080/callback"),
//!     Ozwillo::new(),
//! );
//!
//! let request = client.authorization_url(AuthorizationParams::new().with("prompt", "login"))?;
//! println!("Open {}", request.url);
//!
//! // ... receive `code` on the redirect URI and check `request.state` ...
//! # let code = "";
//! let token = client.exchange_code(code, None).await?;
//! let user = client.resource_owner(&token).await?;
//! println!("Hello {}", user.name()?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod oidc;
pub mod ozwillo;

pub use error::{Error, IdentityProviderError, Result, UserInfoError};
pub use oidc::{AccessToken, AuthorizationParams, ClientCredentials, OAuth2Client};
pub use ozwillo::{Ozwillo, OzwilloUser};
