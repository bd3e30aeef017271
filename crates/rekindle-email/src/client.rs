// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resend HTTP client implementing the [`Notifier`] capability.
//!
//! One JSON POST per email, bearer auth. Failures are reported as
//! [`RekindleError::Notify`]; callers on the inbound path treat them as
//! best-effort.

use async_trait::async_trait;
use rekindle_core::{Notifier, RekindleError};
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.resend.com";

/// Resend-backed notification email.
pub struct ResendMailer {
    http: reqwest::Client,
    api_key: String,
    from_address: String,
    base_url: String,
}

impl ResendMailer {
    pub fn new(api_key: &str, from_address: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.to_string(),
            from_address: from_address.to_string(),
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
impl Notifier for ResendMailer {
    async fn notify(
        &self,
        to_email: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), RekindleError> {
        let url = format!("{}/emails", self.base_url);
        let payload = serde_json::json!({
            "from": self.from_address,
            "to": [to_email],
            "subject": subject,
            "html": html_body,
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| RekindleError::Notify {
                message: format!("resend request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(RekindleError::Notify {
                message: format!("resend returned {status}: {detail}"),
            });
        }

        debug!(to = to_email, subject, "notification email sent");
        Ok(())
    }
}
