//! # HTTP Adapter
//!
//! Serves the relays over HTTP with axum. `/` and `/api` behave the same:
//!
//! - `GET` returns a static status document
//! - `POST` routes on the body's `action` field
//! - `OPTIONS` answers CORS preflight
//!
//! Every response carries `Access-Control-Allow-Origin: *`.

mod handlers;

pub use handlers::{RequestError, SERVICE_NAME, route};

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, header},
    routing::{MethodRouter, get},
};
use log::info;
use tokio::net::TcpListener;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::inference::CompletionProvider;

/// Shared by every request. The provider is built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn CompletionProvider>,
}

fn endpoint() -> MethodRouter<AppState> {
    get(handlers::status)
        .post(handlers::dispatch)
        .options(handlers::preflight)
}

/// Builds the application router around a provider.
pub fn router(provider: Arc<dyn CompletionProvider>) -> Router {
    Router::new()
        .route("/", endpoint())
        .route("/api", endpoint())
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .with_state(AppState { provider })
}

/// Binds `addr` and serves until Ctrl-C.
pub async fn serve(addr: &str, provider: Arc<dyn CompletionProvider>) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(
        "HTTP relay listening on http://{} (provider: {})",
        listener.local_addr()?,
        provider.name()
    );

    axum::serve(listener, router(provider))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Failed to listen for Ctrl-C: {e}");
    }
}
