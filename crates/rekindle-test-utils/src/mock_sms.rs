// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock SMS sender for deterministic testing.
//!
//! Captures outbound sends for assertion and supports programmable
//! transient failures plus a hanging mode for timeout tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use rekindle_core::{DeliveryReceipt, RekindleError, SmsSender};
use tokio::sync::Mutex;

/// One captured outbound SMS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentSms {
    pub from: String,
    pub to: String,
    pub body: String,
}

/// A mock delivery provider.
pub struct MockSms {
    sent: Arc<Mutex<Vec<SentSms>>>,
    fail_budget: Arc<Mutex<u32>>,
    hang: bool,
    seq: AtomicU64,
}

impl MockSms {
    /// A provider that accepts everything.
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail_budget: Arc::new(Mutex::new(0)),
            hang: false,
            seq: AtomicU64::new(0),
        }
    }

    /// A provider that never responds, for exercising attempt timeouts.
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::new()
        }
    }

    /// Make the next `n` sends fail with a transient delivery error.
    pub async fn fail_next(&self, n: u32) {
        *self.fail_budget.lock().await = n;
    }

    /// All messages accepted so far.
    pub async fn sent(&self) -> Vec<SentSms> {
        self.sent.lock().await.clone()
    }

    /// Count of accepted messages.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

impl Default for MockSms {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SmsSender for MockSms {
    async fn send(
        &self,
        from: &str,
        to: &str,
        body: &str,
    ) -> Result<DeliveryReceipt, RekindleError> {
        if self.hang {
            // Far longer than any sensible attempt timeout.
            tokio::time::sleep(std::time::Duration::from_secs(86_400)).await;
        }

        {
            let mut budget = self.fail_budget.lock().await;
            if *budget > 0 {
                *budget -= 1;
                return Err(RekindleError::Delivery {
                    message: "simulated provider failure".to_string(),
                    source: None,
                });
            }
        }

        self.sent.lock().await.push(SentSms {
            from: from.to_string(),
            to: to.to_string(),
            body: body.to_string(),
        });
        let n = self.seq.fetch_add(1, Ordering::Relaxed);
        Ok(DeliveryReceipt {
            provider_sid: format!("SMmock{n:08}"),
        })
    }
}
