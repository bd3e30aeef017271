// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound dispatch sweep.
//!
//! A sweep reclaims abandoned claims, selects due messages in a bounded
//! batch, and processes each one independently: claim, send under a
//! timeout, then record the outcome through a guarded transition. One
//! message failing never blocks the rest of the batch.
//!
//! The delivery capability is constructor-injected; its absence is an
//! explicit `None` and every claimed message then fails terminally with a
//! recorded reason.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rekindle_config::model::EngineConfig;
use rekindle_core::types::MessageStatus;
use rekindle_core::{RekindleError, SmsSender};
use rekindle_storage::queries::messages;
use rekindle_storage::{Database, DueMessage};
use tracing::{debug, error, info, warn};

/// Outcome counters for one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Rows rescued out of a stuck `sending` state before selection.
    pub reclaimed: u64,
    /// Due messages selected for this sweep.
    pub due: usize,
    /// Delivered to the provider and marked `sent`.
    pub sent: usize,
    /// Failed transiently and requeued for the next sweep.
    pub requeued: usize,
    /// Failed terminally.
    pub failed: usize,
    /// Lost the claim race to a concurrent worker.
    pub skipped: usize,
}

enum Disposition {
    Sent,
    Requeued,
    Failed,
    Skipped,
}

/// Periodic outbound dispatcher.
pub struct Dispatcher {
    db: Database,
    sms: Option<Arc<dyn SmsSender>>,
    attempt_timeout: Duration,
    max_retries: u32,
    batch_size: u32,
}

impl Dispatcher {
    pub fn new(db: Database, sms: Option<Arc<dyn SmsSender>>, config: &EngineConfig) -> Self {
        Self {
            db,
            sms,
            attempt_timeout: Duration::from_secs(config.attempt_timeout_secs),
            max_retries: config.max_retries,
            batch_size: config.batch_size,
        }
    }

    /// Run one dispatch sweep at the given instant.
    ///
    /// Taking `now` as a parameter keeps sweeps directly testable; the
    /// serve loop passes the wall clock on every tick.
    pub async fn run_sweep(&self, now: DateTime<Utc>) -> Result<SweepStats, RekindleError> {
        let mut stats = SweepStats::default();

        // Crash recovery: claims older than twice the attempt timeout can
        // no longer have a live attempt behind them.
        let stale_cutoff = now - chrono::Duration::seconds(self.attempt_timeout.as_secs() as i64 * 2);
        stats.reclaimed = messages::reclaim_stale_sending(&self.db, stale_cutoff, now).await?;
        if stats.reclaimed > 0 {
            warn!(
                reclaimed = stats.reclaimed,
                "requeued messages stuck in sending"
            );
        }

        let due = messages::due_messages(&self.db, now, self.max_retries, self.batch_size).await?;
        stats.due = due.len();
        debug!(due = stats.due, "dispatch sweep selected due messages");

        for item in &due {
            match self.dispatch_one(item, now).await {
                Ok(Disposition::Sent) => stats.sent += 1,
                Ok(Disposition::Requeued) => stats.requeued += 1,
                Ok(Disposition::Failed) => stats.failed += 1,
                Ok(Disposition::Skipped) => stats.skipped += 1,
                Err(e) => {
                    stats.failed += 1;
                    error!(
                        message_id = item.message.id.as_str(),
                        error = %e,
                        "dispatch failed"
                    );
                }
            }
        }

        info!(
            due = stats.due,
            sent = stats.sent,
            requeued = stats.requeued,
            failed = stats.failed,
            skipped = stats.skipped,
            "dispatch sweep complete"
        );
        Ok(stats)
    }

    async fn dispatch_one(
        &self,
        item: &DueMessage,
        now: DateTime<Utc>,
    ) -> Result<Disposition, RekindleError> {
        let message = &item.message;

        // The claim is the at-most-once guard: losing it means another
        // worker owns this row.
        if !messages::claim_for_sending(&self.db, &message.id, now).await? {
            debug!(message_id = message.id.as_str(), "claim lost, skipping");
            return Ok(Disposition::Skipped);
        }

        let Some(sender) = self.sms.as_ref() else {
            warn!(
                message_id = message.id.as_str(),
                "sms delivery not configured, failing message"
            );
            messages::mark_failed(&self.db, &message.id, "sms delivery not configured", now)
                .await?;
            return Ok(Disposition::Failed);
        };

        let Some(from) = item.agent_from_number.as_deref() else {
            warn!(
                message_id = message.id.as_str(),
                agent_id = message.agent_id.as_str(),
                "agent has no provisioned sending number, failing message"
            );
            messages::mark_failed(
                &self.db,
                &message.id,
                "agent has no provisioned sending number",
                now,
            )
            .await?;
            return Ok(Disposition::Failed);
        };

        let attempt = tokio::time::timeout(
            self.attempt_timeout,
            sender.send(from, &item.client_phone, &message.body),
        )
        .await;

        match attempt {
            Ok(Ok(receipt)) => {
                messages::mark_sent(&self.db, &message.id, &receipt.provider_sid, now).await?;
                info!(
                    message_id = message.id.as_str(),
                    provider_sid = receipt.provider_sid.as_str(),
                    "message sent"
                );
                Ok(Disposition::Sent)
            }
            Ok(Err(e)) => {
                warn!(
                    message_id = message.id.as_str(),
                    error = %e,
                    "delivery attempt failed"
                );
                self.record_failure(&message.id, &e.to_string(), now).await
            }
            Err(_elapsed) => {
                // A timeout counts against the retry budget like any other
                // delivery failure.
                warn!(
                    message_id = message.id.as_str(),
                    timeout_secs = self.attempt_timeout.as_secs(),
                    "delivery attempt timed out"
                );
                self.record_failure(&message.id, "delivery attempt timed out", now)
                    .await
            }
        }
    }

    async fn record_failure(
        &self,
        message_id: &str,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<Disposition, RekindleError> {
        match messages::record_attempt_failure(&self.db, message_id, reason, self.max_retries, now)
            .await?
        {
            Some(MessageStatus::Failed) => Ok(Disposition::Failed),
            Some(_) => Ok(Disposition::Requeued),
            None => Ok(Disposition::Skipped),
        }
    }
}
