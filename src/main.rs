//! Ozwillo login - Main entry point
//!
//! Signs a user in to Ozwillo with the authorization code flow and prints the
//! userinfo claims as JSON on stdout.

use oauth2_ozwillo::config::Config;
use oauth2_ozwillo::error::{Error, Result};
use oauth2_ozwillo::oidc::callback::CallbackListener;
use oauth2_ozwillo::oidc::OAuth2Client;
use oauth2_ozwillo::ozwillo::Ozwillo;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

fn setup_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}", config.log_level())));

    // stdout carries the profile JSON only
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    let config = Config::parse_args();

    setup_logging(&config);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run_login(config).await {
        error!("Login failed: {}", e);
        std::process::exit(1);
    }
}

async fn run_login(config: Config) -> Result<()> {
    let client = OAuth2Client::new(
        config.credentials(),
        Ozwillo::with_scopes(config.scopes.clone()),
    );

    info!("Client ID: {}", config.client_id);
    info!("Redirect URL: {}", config.redirect_url());

    // Bind before redirecting so the callback cannot race the listener
    let (addr, path) = config.callback_endpoint()?;
    let listener = CallbackListener::bind(addr, &path).await?;

    let request = client.authorization_url(config.authorization_params())?;

    if config.no_browser {
        eprintln!("\nOpen this URL in your browser:\n\n{}\n", request.url);
    } else {
        info!("Opening browser for authorization");
        if let Err(e) = webbrowser::open(request.url.as_str()) {
            warn!("Failed to open browser: {}", e);
            eprintln!("\nCould not open browser automatically.");
            eprintln!("Please open this URL in your browser:\n\n{}\n", request.url);
        }
    }

    let callback = listener.wait(CALLBACK_TIMEOUT).await?;

    if callback.state != request.state {
        return Err(Error::Callback(
            "State mismatch - possible CSRF attack".to_string(),
        ));
    }

    let token = client.exchange_code(&callback.code, None).await?;
    info!("Authorization code exchanged");

    let user = client.resource_owner(&token).await?;
    info!("Signed in as {}", user.id());

    println!("{}", serde_json::to_string_pretty(&user)?);

    Ok(())
}
