use axum::routing::get;
use axum::Router;
use log::info;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::error::{ErrorCode, RelayError, Result};
use crate::streamrelay::net::webhook::{handle_challenge, handle_event, WebhookState};

/// Path the provider calls back on
pub const WEBHOOK_PATH: &str = "/webhook";

pub fn router(state: WebhookState) -> Router {
    Router::new()
        .route(WEBHOOK_PATH, get(handle_challenge).post(handle_event))
        .with_state(state)
}

/// Serves the webhook routes until `shutdown` is cancelled
pub async fn run_webhook_server(addr: &str, state: WebhookState, shutdown: CancellationToken) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| RelayError::new(ErrorCode::BindFailed, format!("Failed to bind {}: {}", addr, e)))?;
    info!("Webhook server running on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| RelayError::new(ErrorCode::InternalServerError, format!("Webhook server failed: {}", e)))?;

    info!("Webhook server stopped");
    Ok(())
}
