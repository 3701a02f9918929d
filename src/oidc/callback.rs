//! OAuth redirect listener
//!
//! Loopback HTTP server that receives the authorization redirect and hands
//! the code and state back to the waiting flow.

use crate::error::{Error, Result};
use axum::{
    extract::Query,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackResult {
    pub code: String,
    pub state: String,
}

type ResultSender = Arc<Mutex<Option<oneshot::Sender<Result<CallbackResult>>>>>;

/// Bound redirect listener, ready to wait for one callback
pub struct CallbackListener {
    listener: TcpListener,
    path: String,
}

impl CallbackListener {
    /// Bind the listener; port 0 picks a free port
    pub async fn bind(addr: SocketAddr, path: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            path: path.to_string(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until the first callback arrives or `timeout` elapses
    pub async fn wait(self, timeout: Duration) -> Result<CallbackResult> {
        let (tx, rx) = oneshot::channel::<Result<CallbackResult>>();
        let tx: ResultSender = Arc::new(Mutex::new(Some(tx)));

        let app = Router::new().route(
            &self.path,
            get(move |Query(params): Query<CallbackQuery>| {
                let tx = tx.clone();
                async move { handle_callback(params, tx).await }
            }),
        );

        tracing::info!(
            "OAuth callback server listening on http://{}{}",
            self.listener.local_addr()?,
            self.path
        );

        let server = axum::serve(self.listener, app);

        tokio::select! {
            result = rx => {
                result.map_err(|_| Error::Callback("Callback channel closed".to_string()))?
            }
            _ = tokio::time::sleep(timeout) => {
                Err(Error::Timeout(format!(
                    "OAuth callback timed out after {} seconds",
                    timeout.as_secs()
                )))
            }
            server_result = server => {
                server_result?;
                Err(Error::Callback("Server stopped unexpectedly".to_string()))
            }
        }
    }
}

async fn handle_callback(params: CallbackQuery, tx: ResultSender) -> impl IntoResponse {
    let outcome = match (params.error, params.code, params.state) {
        (Some(error), _, _) => {
            let description = params
                .error_description
                .unwrap_or_else(|| "No description provided".to_string());
            Err(format!("OAuth error: {} - {}", error, description))
        }
        (None, Some(code), Some(state)) => Ok(CallbackResult { code, state }),
        _ => Err("Missing code or state parameter in callback".to_string()),
    };

    let page = match &outcome {
        Ok(_) => render_page(
            "Authentication Successful",
            "You have been successfully authenticated. You can close this window.",
        ),
        Err(message) => render_page("Authentication Failed", message),
    };

    if let Some(sender) = tx.lock().await.take() {
        let _ = sender.send(outcome.map_err(Error::Callback));
    }

    page
}

fn render_page(title: &str, message: &str) -> Html<String> {
    Html(format!(
        r#"<html>
    <head><title>{title}</title></head>
    <body>
        <h1>{title}</h1>
        <p>{message}</p>
    </body>
</html>"#
    ))
}
