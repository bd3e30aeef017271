// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Referral recording.
//!
//! A referral is a lead attributed to a past client. Recording one bumps
//! the referring client's engagement score the same +10 a reply earns,
//! since making an introduction is the strongest engagement signal there is.

use chrono::{DateTime, Utc};
use rekindle_core::RekindleError;
use rekindle_core::types::{Agent, NewReferral, Referral};
use rekindle_storage::Database;
use rekindle_storage::queries::{clients, referrals};
use tracing::info;

/// Record a referral made by one of the agent's clients.
///
/// The referring client must exist inside the agent's tenancy.
pub async fn record_referral(
    db: &Database,
    agent: &Agent,
    new: NewReferral,
    now: DateTime<Utc>,
) -> Result<Referral, RekindleError> {
    if new.first_name.trim().is_empty() || new.last_name.trim().is_empty() {
        return Err(RekindleError::Validation(
            "referral first and last name are required".into(),
        ));
    }

    let Some(client) =
        clients::find_for_agent(db, &new.referred_by_client_id, &agent.id).await?
    else {
        return Err(RekindleError::Validation(
            "referring client not found".into(),
        ));
    };

    let referral = Referral::from_new(new, &agent.id, now);
    referrals::insert_referral(db, &referral).await?;

    clients::bump_engagement(db, &client.id, 10, now).await?;

    info!(
        referral_id = referral.id.as_str(),
        client_id = client.id.as_str(),
        "referral recorded"
    );
    Ok(referral)
}
