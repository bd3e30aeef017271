// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock notifier capturing notification email for assertion.

use std::sync::Arc;

use async_trait::async_trait;
use rekindle_core::{Notifier, RekindleError};
use tokio::sync::Mutex;

/// One captured notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// A mock notification transport.
pub struct MockNotifier {
    sent: Arc<Mutex<Vec<SentNotification>>>,
    fail: bool,
}

impl MockNotifier {
    /// A notifier that accepts everything.
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    /// A notifier whose every send fails, for best-effort path tests.
    pub fn failing() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        }
    }

    /// All notifications accepted so far.
    pub async fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().await.clone()
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(
        &self,
        to_email: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), RekindleError> {
        if self.fail {
            return Err(RekindleError::Notify {
                message: "simulated notification failure".to_string(),
            });
        }
        self.sent.lock().await.push(SentNotification {
            to: to_email.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        });
        Ok(())
    }
}
