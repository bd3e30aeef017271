// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Out-of-band agent notification capability.

use async_trait::async_trait;

use crate::error::RekindleError;

/// Delivers a notification email to an agent.
///
/// Best-effort from the engine's perspective: callers on the inbound path
/// log failures and continue, never rolling back committed state.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        to_email: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), RekindleError>;
}
