// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook request handlers.
//!
//! The provider expects a 2xx-equivalent acknowledgment whatever happens
//! internally; there is no retry channel back to the sender. Malformed
//! events are rejected at this boundary and everything else is acknowledged
//! with empty TwiML after the correlator has run.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use chrono::Utc;
use rekindle_engine::InboundSms;
use rekindle_sms::validate_signature;
use tracing::{error, warn};

use crate::server::GatewayState;

const EMPTY_TWIML: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response></Response>";

fn twiml(status: StatusCode) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/xml; charset=utf-8")],
        EMPTY_TWIML,
    )
        .into_response()
}

fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// `POST /twilio/incoming`: inbound SMS.
pub async fn post_incoming(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Form(params): Form<Vec<(String, String)>>,
) -> Response {
    if let Some(signing) = state.signature.as_ref() {
        let signature = headers
            .get("x-twilio-signature")
            .and_then(|value| value.to_str().ok());
        let valid = signature.is_some_and(|signature| {
            validate_signature(&signing.auth_token, &signing.incoming_url, &params, signature)
        });
        if !valid {
            warn!("rejected inbound webhook with missing or invalid signature");
            return twiml(StatusCode::FORBIDDEN);
        }
    }

    let (Some(from), Some(to), Some(body)) = (
        param(&params, "From"),
        param(&params, "To"),
        param(&params, "Body"),
    ) else {
        return twiml(StatusCode::BAD_REQUEST);
    };

    let event = InboundSms {
        from: from.to_string(),
        to: to.to_string(),
        body: body.to_string(),
        provider_sid: param(&params, "MessageSid").map(str::to_string),
    };

    // Internal failures are logged, never surfaced: the provider would just
    // redeliver an event we cannot process any better.
    if let Err(e) = state.correlator.handle_inbound(&event, Utc::now()).await {
        error!(error = %e, "inbound sms processing failed");
    }

    twiml(StatusCode::OK)
}

/// `POST /twilio/status`: delivery receipt callback.
pub async fn post_status(
    State(state): State<GatewayState>,
    Form(params): Form<Vec<(String, String)>>,
) -> Response {
    if let (Some(sid), Some(delivery_status)) = (
        param(&params, "MessageSid"),
        param(&params, "MessageStatus"),
    ) {
        if let Err(e) = state
            .correlator
            .handle_delivery_receipt(sid, delivery_status, Utc::now())
            .await
        {
            error!(error = %e, "delivery receipt processing failed");
        }
    }
    StatusCode::OK.into_response()
}

/// `GET /health`: liveness for the process supervisor.
pub async fn get_health() -> Response {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
    .into_response()
}
