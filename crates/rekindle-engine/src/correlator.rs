// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound SMS correlation.
//!
//! Resolves an inbound message to its agent and client, classifies it
//! (opt-out before anything else), and updates message and client state.
//! Unresolvable events are logged and dropped; the webhook boundary
//! acknowledges the provider regardless, because the sender has no
//! meaningful retry channel.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rekindle_core::{Notifier, RekindleError};
use rekindle_storage::Database;
use rekindle_storage::queries::{agents, clients, messages};
use tracing::{debug, info, warn};

use crate::notifications;

/// Keywords that end the relationship. Matched against the whole normalized
/// body, never as a substring.
pub const OPT_OUT_KEYWORDS: [&str; 5] = ["stop", "unsubscribe", "cancel", "quit", "end"];

/// An inbound SMS event as the webhook boundary hands it over.
#[derive(Debug, Clone)]
pub struct InboundSms {
    /// Sender phone number (the client).
    pub from: String,
    /// Receiving phone number (the agent's provisioned number).
    pub to: String,
    pub body: String,
    pub provider_sid: Option<String>,
}

/// What the correlator did with an inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundOutcome {
    /// No agent owns the receiving number; event dropped.
    UnknownAgent,
    /// No active client with the sending number under that agent; dropped.
    UnknownClient,
    /// Opt-out keyword: client deactivated, scheduled messages cancelled.
    OptedOut { cancelled: u64 },
    /// Reply correlated to the most recent outbound message.
    Reply,
    /// Reply with no sent message to attach to; engagement still recorded.
    UnmatchedReply,
}

/// Correlates inbound provider events to stored state.
pub struct Correlator {
    db: Database,
    notifier: Option<Arc<dyn Notifier>>,
}

impl Correlator {
    pub fn new(db: Database, notifier: Option<Arc<dyn Notifier>>) -> Self {
        Self { db, notifier }
    }

    /// Process one inbound SMS.
    ///
    /// Never returns a user-visible error for unresolvable events; those
    /// are logged and reported through the outcome.
    pub async fn handle_inbound(
        &self,
        event: &InboundSms,
        now: DateTime<Utc>,
    ) -> Result<InboundOutcome, RekindleError> {
        info!(
            from = event.from.as_str(),
            to = event.to.as_str(),
            "inbound sms received"
        );

        let Some(agent) = agents::find_agent_by_sms_number(&self.db, &event.to).await? else {
            warn!(to = event.to.as_str(), "no agent owns receiving number");
            return Ok(InboundOutcome::UnknownAgent);
        };

        // A phone number may belong to clients of several agents; resolution
        // is always scoped to the receiving agent's tenancy.
        let Some(client) =
            clients::find_active_by_phone(&self.db, &agent.id, &event.from).await?
        else {
            warn!(
                from = event.from.as_str(),
                agent_id = agent.id.as_str(),
                "no active client matches sender"
            );
            return Ok(InboundOutcome::UnknownClient);
        };

        let normalized = event.body.trim().to_lowercase();
        if OPT_OUT_KEYWORDS.contains(&normalized.as_str()) {
            // Opt-out wins over reply handling unconditionally.
            clients::deactivate(&self.db, &client.id, now).await?;
            let cancelled =
                messages::cancel_scheduled_for_client(&self.db, &client.id, now).await?;
            info!(
                client_id = client.id.as_str(),
                cancelled, "client opted out"
            );
            return Ok(InboundOutcome::OptedOut { cancelled });
        }

        // Correlate to the most recent outbound message. There is no stable
        // provider thread key for SMS, so recency is the tie-breaker.
        let recent = messages::find_recent_sent_for_client(&self.db, &client.id).await?;
        let matched = match recent {
            Some(message) => messages::mark_replied(&self.db, &message.id, &event.body, now).await?,
            None => false,
        };
        if !matched {
            debug!(
                client_id = client.id.as_str(),
                "reply arrived with no sent message to attach to"
            );
        }

        clients::bump_engagement(&self.db, &client.id, 10, now).await?;

        // Best-effort: a notification failure never rolls back the recorded
        // reply.
        if let Some(notifier) = self.notifier.as_ref() {
            let (subject, html) = notifications::reply_notification(
                &agent.first_name,
                &client.full_name(),
                &event.body,
            );
            if let Err(e) = notifier.notify(&agent.email, &subject, &html).await {
                warn!(
                    agent_id = agent.id.as_str(),
                    error = %e,
                    "reply notification failed"
                );
            }
        }

        info!(
            client_id = client.id.as_str(),
            agent_id = agent.id.as_str(),
            matched, "reply processed"
        );
        Ok(if matched {
            InboundOutcome::Reply
        } else {
            InboundOutcome::UnmatchedReply
        })
    }

    /// Apply a provider delivery receipt.
    ///
    /// Only the `delivered` status advances state (`sent -> delivered`);
    /// everything else is acknowledged and ignored. Returns whether a row
    /// was updated.
    pub async fn handle_delivery_receipt(
        &self,
        provider_sid: &str,
        delivery_status: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, RekindleError> {
        if delivery_status != "delivered" {
            debug!(
                provider_sid,
                delivery_status, "ignoring non-delivered receipt"
            );
            return Ok(false);
        }
        let updated = messages::mark_delivered_by_sid(&self.db, provider_sid, now).await?;
        if updated {
            info!(provider_sid, "message delivered");
        } else {
            debug!(provider_sid, "receipt for unknown or already-settled message");
        }
        Ok(updated)
    }
}
