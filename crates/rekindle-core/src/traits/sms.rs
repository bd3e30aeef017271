// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound SMS delivery capability.

use async_trait::async_trait;

use crate::error::RekindleError;

/// Provider acknowledgment for an accepted outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Provider-assigned message identifier, unique per message.
    pub provider_sid: String,
}

/// Sends one SMS from a provisioned number to a recipient.
///
/// Implementations must not retry internally; the dispatcher owns the retry
/// policy and the per-attempt timeout.
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(
        &self,
        from: &str,
        to: &str,
        body: &str,
    ) -> Result<DeliveryReceipt, RekindleError>;
}
