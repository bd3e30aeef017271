// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Twilio REST client implementing the [`SmsSender`] capability.
//!
//! One POST per message to the Messages endpoint, basic auth, form body.
//! No internal retries; the dispatcher owns retry policy and timeouts.

use async_trait::async_trait;
use rekindle_core::{DeliveryReceipt, RekindleError, SmsSender};
use serde::Deserialize;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.twilio.com";

/// Twilio-backed SMS delivery.
pub struct TwilioSender {
    http: reqwest::Client,
    account_sid: String,
    auth_token: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CreateMessageResponse {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct TwilioErrorBody {
    message: Option<String>,
    code: Option<i64>,
}

impl TwilioSender {
    pub fn new(account_sid: &str, auth_token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            account_sid: account_sid.to_string(),
            auth_token: auth_token.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different API host. For tests.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl SmsSender for TwilioSender {
    async fn send(
        &self,
        from: &str,
        to: &str,
        body: &str,
    ) -> Result<DeliveryReceipt, RekindleError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("From", from), ("To", to), ("Body", body)])
            .send()
            .await
            .map_err(|e| RekindleError::Delivery {
                message: format!("twilio request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<TwilioErrorBody>()
                .await
                .ok()
                .and_then(|b| match (b.code, b.message) {
                    (Some(code), Some(message)) => Some(format!("{code}: {message}")),
                    (_, Some(message)) => Some(message),
                    _ => None,
                })
                .unwrap_or_else(|| "no error detail".to_string());
            return Err(RekindleError::Delivery {
                message: format!("twilio returned {status}: {detail}"),
                source: None,
            });
        }

        let created: CreateMessageResponse =
            response.json().await.map_err(|e| RekindleError::Delivery {
                message: format!("twilio response malformed: {e}"),
                source: Some(Box::new(e)),
            })?;

        debug!(sid = created.sid.as_str(), "twilio accepted message");
        Ok(DeliveryReceipt {
            provider_sid: created.sid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn send_posts_form_and_returns_sid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2010-04-01/Accounts/AC123/Messages.json"))
            .and(body_string_contains("From=%2B15551230000"))
            .and(body_string_contains("To=%2B15557654321"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "sid": "SM0123456789abcdef",
                "status": "queued"
            })))
            .mount(&server)
            .await;

        let sender = TwilioSender::new("AC123", "token").with_base_url(&server.uri());
        let receipt = sender
            .send("+15551230000", "+15557654321", "Hey Sam!")
            .await
            .unwrap();
        assert_eq!(receipt.provider_sid, "SM0123456789abcdef");
    }

    #[tokio::test]
    async fn provider_error_surfaces_code_and_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "code": 21211,
                "message": "The 'To' number is not a valid phone number.",
                "status": 400
            })))
            .mount(&server)
            .await;

        let sender = TwilioSender::new("AC123", "token").with_base_url(&server.uri());
        let err = sender
            .send("+15551230000", "bogus", "Hey!")
            .await
            .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("21211"), "got: {text}");
        assert!(text.contains("not a valid phone number"), "got: {text}");
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_delivery_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_string("not json"))
            .mount(&server)
            .await;

        let sender = TwilioSender::new("AC123", "token").with_base_url(&server.uri());
        let err = sender
            .send("+15551230000", "+15557654321", "Hey!")
            .await
            .unwrap_err();
        assert!(matches!(err, RekindleError::Delivery { .. }));
    }
}
