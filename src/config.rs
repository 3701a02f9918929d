//! Configuration parsing and validation

use crate::error::{Error, Result};
use crate::oidc::{AuthorizationParams, ClientCredentials};
use clap::Parser;
use std::net::{Ipv4Addr, SocketAddr};
use url::Url;

const DEFAULT_REDIRECT_URL: &str = "http://localhost:8080/callback";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "ozwillo-login",
    version,
    about = "Sign in to Ozwillo and print the user profile",
    long_about = "Runs the OpenID Connect authorization code flow against Ozwillo through a local redirect listener and prints the userinfo claims as JSON"
)]
pub struct Config {
    /// OAuth client ID
    #[arg(long, env = "OZWILLO_CLIENT_ID")]
    pub client_id: String,

    /// OAuth client secret (optional for public clients)
    #[arg(long, env = "OZWILLO_CLIENT_SECRET")]
    pub client_secret: Option<String>,

    /// Localhost URL for OAuth redirect (default: http://localhost:8080/callback)
    #[arg(long, env = "OZWILLO_REDIRECT_URL")]
    pub redirect_url: Option<String>,

    /// Extra scope to request on top of the defaults (repeatable)
    #[arg(long = "scope", value_name = "SCOPE")]
    pub scopes: Vec<String>,

    /// OIDC prompt value (e.g. "login", "consent")
    #[arg(long)]
    pub prompt: Option<String>,

    /// Space-separated preferred UI languages (e.g. "fr en")
    #[arg(long)]
    pub ui_locales: Option<String>,

    /// Print the authorization URL instead of opening a browser
    #[arg(long)]
    pub no_browser: bool,

    /// Show only error messages
    #[arg(long, conflicts_with = "debug")]
    pub silent: bool,

    /// Enable debug logging
    #[arg(long, env = "OZWILLO_DEBUG")]
    pub debug: bool,
}

impl Config {
    /// Parse configuration from CLI arguments and environment variables
    pub fn parse_args() -> Self {
        Config::parse()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.client_id.is_empty() {
            return Err(Error::Config("Client ID is required".to_string()));
        }

        let redirect = Url::parse(&self.redirect_url())
            .map_err(|e| Error::Config(format!("Invalid redirect URL: {}", e)))?;

        match redirect.host_str() {
            Some("localhost") | Some("127.0.0.1") => Ok(()),
            _ => Err(Error::Config(
                "Redirect URL must point to localhost".to_string(),
            )),
        }
    }

    /// Get redirect URL (with default)
    pub fn redirect_url(&self) -> String {
        self.redirect_url
            .clone()
            .unwrap_or_else(|| DEFAULT_REDIRECT_URL.to_string())
    }

    /// Loopback address and path the redirect listener serves
    pub fn callback_endpoint(&self) -> Result<(SocketAddr, String)> {
        let redirect = Url::parse(&self.redirect_url())?;
        let port = redirect.port_or_known_default().unwrap_or(8080);

        Ok((
            SocketAddr::from((Ipv4Addr::LOCALHOST, port)),
            redirect.path().to_string(),
        ))
    }

    pub fn credentials(&self) -> ClientCredentials {
        ClientCredentials::new(
            self.client_id.clone(),
            self.client_secret.clone(),
            self.redirect_url(),
        )
    }

    /// Caller options for the authorization request
    pub fn authorization_params(&self) -> AuthorizationParams {
        let mut params = AuthorizationParams::new();

        if let Some(ref prompt) = self.prompt {
            params.set("prompt", prompt.as_str());
        }

        if let Some(ref ui_locales) = self.ui_locales {
            params.set("ui_locales", ui_locales.as_str());
        }

        params
    }

    /// Get log level based on flags
    pub fn log_level(&self) -> tracing::Level {
        if self.silent {
            tracing::Level::ERROR
        } else if self.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
