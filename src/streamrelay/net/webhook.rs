use std::sync::Arc;

use axum::extract::{Query, State};
use bytes::Bytes;
use log::{debug, info, warn};

use crate::streamrelay::dispatcher::NotificationDispatcher;
use crate::streamrelay::{parser, verifier};

/// Body returned once an event has been fanned out
pub const DISPATCHED: &str = "it worked";

/// Shared state of the webhook routes
#[derive(Clone)]
pub struct WebhookState {
    pub dispatcher: Arc<NotificationDispatcher>,
}

/// GET: subscription handshake. Always 200; failures are told apart by body.
pub async fn handle_challenge(Query(params): Query<Vec<(String, String)>>) -> String {
    debug!("Received handshake with params: {:?}", params);

    match verifier::handle_challenge(&params) {
        Ok(token) => {
            info!("Answered handshake challenge");
            token
        }
        Err(e) => {
            warn!("Rejected handshake: {} ({})", e, e.code());
            e.response_body().to_string()
        }
    }
}

/// POST: stream event notification. Always 200; failures are told apart by body.
pub async fn handle_event(State(state): State<WebhookState>, body: Bytes) -> String {
    debug!("Received webhook event of {} bytes", body.len());

    let event = match parser::parse(&body) {
        Ok(event) => event,
        Err(e) if e.is_ignorable() => {
            debug!("Ignoring webhook event: {}", e);
            return e.response_body().to_string();
        }
        Err(e) => {
            warn!("Failed to parse webhook event: {} ({})", e, e.code());
            return e.response_body().to_string();
        }
    };

    let report = state.dispatcher.dispatch(&event).await;
    if report.failed() > 0 {
        warn!(
            "[{}] {} of {} notifications for {} failed",
            report.id,
            report.failed(),
            report.outcomes.len(),
            report.topic
        );
    }

    DISPATCHED.to_string()
}
