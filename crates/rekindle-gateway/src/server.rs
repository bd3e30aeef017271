// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook HTTP server built on axum.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use rekindle_core::RekindleError;
use rekindle_engine::Correlator;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Signature validation settings. Absent means signatures are not checked
/// (local development, or a fronting proxy already authenticates).
#[derive(Clone)]
pub struct SignatureConfig {
    /// The Twilio auth token the signature is keyed with.
    pub auth_token: String,
    /// Externally visible URL of the incoming-SMS endpoint, exactly as the
    /// provider sees it.
    pub incoming_url: String,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub correlator: Arc<Correlator>,
    pub signature: Option<SignatureConfig>,
}

/// Server bind settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Build the webhook router.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/twilio/incoming", post(handlers::post_incoming))
        .route("/twilio/status", post(handlers::post_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve the webhook endpoints until `cancel` fires.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), RekindleError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| RekindleError::Internal(format!("failed to bind webhook server to {addr}: {e}")))?;

    tracing::info!("webhook server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| RekindleError::Internal(format!("webhook server error: {e}")))?;

    Ok(())
}
