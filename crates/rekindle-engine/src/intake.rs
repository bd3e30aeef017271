// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client intake: the client-creation event that triggers scheduling.
//!
//! Validates attributes, enforces the agent's tier capacity, rejects
//! duplicate phone numbers within the tenancy, then inserts the client and
//! schedules their follow-up cadence in one pass.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use rekindle_core::RekindleError;
use rekindle_core::types::{Agent, Client, NewClient};
use rekindle_storage::Database;
use rekindle_storage::queries::clients;
use tracing::info;

use crate::scheduler;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+1\d{10}$").expect("phone pattern is valid"));

fn validate(new: &NewClient) -> Result<(), RekindleError> {
    if new.first_name.trim().is_empty() {
        return Err(RekindleError::Validation("first name is required".into()));
    }
    if new.last_name.trim().is_empty() {
        return Err(RekindleError::Validation("last name is required".into()));
    }
    if !PHONE_RE.is_match(&new.phone_number) {
        return Err(RekindleError::Validation(
            "phone number must be in E.164 format: +1XXXXXXXXXX".into(),
        ));
    }
    Ok(())
}

/// Add a client for an agent and schedule their follow-ups.
///
/// Returns the stored client and the number of messages scheduled. The
/// scheduler runs exactly once per client, here.
pub async fn enroll_client(
    db: &Database,
    agent: &Agent,
    new: NewClient,
    now: DateTime<Utc>,
) -> Result<(Client, usize), RekindleError> {
    validate(&new)?;

    if let Some(limit) = agent.subscription_tier.limits().max_active_clients {
        let current = clients::count_active_for_agent(db, &agent.id).await?;
        if current >= limit {
            return Err(RekindleError::TierLimit {
                tier: agent.subscription_tier.to_string(),
                current,
                limit,
            });
        }
    }

    if clients::find_active_by_phone(db, &agent.id, &new.phone_number)
        .await?
        .is_some()
    {
        return Err(RekindleError::Validation(format!(
            "an active client with phone {} already exists",
            new.phone_number
        )));
    }

    let client = Client::from_new(new, &agent.id, now);
    clients::insert_client(db, &client).await?;

    let scheduled = scheduler::schedule_for_client(db, &client, agent, now).await?;

    info!(
        client_id = client.id.as_str(),
        agent_id = agent.id.as_str(),
        scheduled, "client enrolled"
    );
    Ok((client, scheduled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use rekindle_test_utils::fixtures;
    use rekindle_test_utils::fresh_db;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn new_client(phone: &str) -> NewClient {
        NewClient {
            first_name: "Sam".to_string(),
            last_name: "Okafor".to_string(),
            phone_number: phone.to_string(),
            city: Some("Austin".to_string()),
            closing_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            ..NewClient::default()
        }
    }

    #[tokio::test]
    async fn enrollment_creates_client_and_schedules_cadence() {
        let (db, _dir) = fresh_db().await;
        let agent = fixtures::agent("agent-1");
        rekindle_storage::queries::agents::insert_agent(&db, &agent)
            .await
            .unwrap();

        let (client, scheduled) = enroll_client(&db, &agent, new_client("+15557654321"), now())
            .await
            .unwrap();
        assert_eq!(scheduled, 5);
        assert_eq!(client.engagement_score, 50);
        assert!(client.is_active);

        let stored = rekindle_storage::queries::clients::find_client(&db, &client.id)
            .await
            .unwrap();
        assert!(stored.is_some());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn malformed_phone_is_rejected() {
        let (db, _dir) = fresh_db().await;
        let agent = fixtures::agent("agent-1");
        rekindle_storage::queries::agents::insert_agent(&db, &agent)
            .await
            .unwrap();

        for bad in ["5551234567", "+445551234567", "+1555123456", "not-a-phone"] {
            let result = enroll_client(&db, &agent, new_client(bad), now()).await;
            assert!(
                matches!(result, Err(RekindleError::Validation(_))),
                "{bad} should be rejected"
            );
        }

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_phone_within_tenancy_is_rejected() {
        let (db, _dir) = fresh_db().await;
        let agent = fixtures::agent("agent-1");
        rekindle_storage::queries::agents::insert_agent(&db, &agent)
            .await
            .unwrap();

        enroll_client(&db, &agent, new_client("+15557654321"), now())
            .await
            .unwrap();
        let result = enroll_client(&db, &agent, new_client("+15557654321"), now()).await;
        assert!(matches!(result, Err(RekindleError::Validation(_))));

        // The same number under a different agent is fine. (No sending
        // number on the second agent; those are globally unique.)
        let other = fixtures::agent_without_number("agent-2");
        rekindle_storage::queries::agents::insert_agent(&db, &other)
            .await
            .unwrap();
        enroll_client(&db, &other, new_client("+15557654321"), now())
            .await
            .unwrap();

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn tier_capacity_is_enforced() {
        let (db, _dir) = fresh_db().await;
        let mut agent = fixtures::agent("agent-1");
        agent.subscription_tier = rekindle_core::types::SubscriptionTier::Starter;
        rekindle_storage::queries::agents::insert_agent(&db, &agent)
            .await
            .unwrap();

        // Starter allows 20 active clients.
        for i in 0..20 {
            enroll_client(&db, &agent, new_client(&format!("+1555000{i:04}")), now())
                .await
                .unwrap();
        }

        let result = enroll_client(&db, &agent, new_client("+15559990000"), now()).await;
        match result {
            Err(RekindleError::TierLimit {
                current, limit, ..
            }) => {
                assert_eq!(current, 20);
                assert_eq!(limit, 20);
            }
            other => panic!("expected tier limit error, got {other:?}"),
        }

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn brokerage_tier_is_unlimited() {
        let (db, _dir) = fresh_db().await;
        let mut agent = fixtures::agent("agent-1");
        agent.subscription_tier = rekindle_core::types::SubscriptionTier::Brokerage;
        rekindle_storage::queries::agents::insert_agent(&db, &agent)
            .await
            .unwrap();

        // Well past every bounded tier's limit; spot-check a couple dozen.
        for i in 0..25 {
            enroll_client(&db, &agent, new_client(&format!("+1555000{i:04}")), now())
                .await
                .unwrap();
        }

        db.close().await.unwrap();
    }
}
