// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Follow-up scheduling at client creation time.
//!
//! Reads the active template cadence and persists one future-dated message
//! per template. Dates already in the past at schedule time are skipped, so
//! importing a client who closed years ago creates only the touches that
//! are still ahead of them.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use rekindle_core::RekindleError;
use rekindle_core::types::{Agent, Client, MessageRecord};
use rekindle_storage::Database;
use rekindle_storage::queries::{messages, templates};
use tracing::info;

use crate::personalizer;

/// Create the scheduled messages for a newly added client.
///
/// Each insert is independent; there is no rollback across templates. The
/// caller invokes this exactly once per client, at creation time. Returns
/// the number of messages actually created, which is zero for clients whose
/// closing date predates every template offset.
pub async fn schedule_for_client(
    db: &Database,
    client: &Client,
    agent: &Agent,
    now: DateTime<Utc>,
) -> Result<usize, RekindleError> {
    let active_templates = templates::list_active(db).await?;

    let mut scheduled = 0;
    for template in &active_templates {
        let send_date = client.closing_date + Duration::days(template.trigger_days_after_closing);
        let scheduled_for = send_date.and_time(NaiveTime::MIN).and_utc();

        // Only strictly future dates; a send time of "now" is already late.
        if scheduled_for <= now {
            continue;
        }

        let body = personalizer::render(&template.body, client, agent);
        let message = MessageRecord::scheduled(client, body, scheduled_for, now);
        messages::insert_message(db, &message).await?;
        scheduled += 1;
    }

    info!(
        client_id = client.id.as_str(),
        scheduled, "scheduled follow-up messages for client"
    );
    Ok(scheduled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use rekindle_core::types::MessageStatus;
    use rekindle_storage::queries::clients;
    use rekindle_test_utils::fixtures;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn full_cadence_for_a_fresh_closing() {
        let (db, _dir) = rekindle_test_utils::fresh_db().await;
        let agent = fixtures::agent("agent-1");
        rekindle_storage::queries::agents::insert_agent(&db, &agent)
            .await
            .unwrap();

        // Closed today: all five stock touches are still ahead.
        let client = fixtures::client(
            "client-1",
            &agent.id,
            "+15557654321",
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        );
        clients::insert_client(&db, &client).await.unwrap();

        let created = schedule_for_client(&db, &client, &agent, now()).await.unwrap();
        assert_eq!(created, 5);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn ancient_closing_schedules_nothing() {
        let (db, _dir) = rekindle_test_utils::fresh_db().await;
        let agent = fixtures::agent("agent-1");
        rekindle_storage::queries::agents::insert_agent(&db, &agent)
            .await
            .unwrap();

        // Closed a decade ago: every offset has long passed.
        let client = fixtures::client(
            "client-1",
            &agent.id,
            "+15557654321",
            NaiveDate::from_ymd_opt(2016, 3, 1).unwrap(),
        );
        clients::insert_client(&db, &client).await.unwrap();

        let created = schedule_for_client(&db, &client, &agent, now()).await.unwrap();
        assert_eq!(created, 0);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn past_offsets_are_skipped_future_ones_kept() {
        let (db, _dir) = rekindle_test_utils::fresh_db().await;
        let agent = fixtures::agent("agent-1");
        rekindle_storage::queries::agents::insert_agent(&db, &agent)
            .await
            .unwrap();

        rekindle_test_utils::use_only_templates(
            &db,
            &[
                fixtures::template("t-7", 7, "Hi {{first_name}}!"),
                fixtures::template("t-90", 90, "Checking in, {{first_name}}."),
            ],
        )
        .await;

        // Closed ten days ago: the 7-day touch has passed, the 90-day has not.
        let client = fixtures::client(
            "client-1",
            &agent.id,
            "+15557654321",
            NaiveDate::from_ymd_opt(2026, 2, 19).unwrap(),
        );
        clients::insert_client(&db, &client).await.unwrap();

        let created = schedule_for_client(&db, &client, &agent, now()).await.unwrap();
        assert_eq!(created, 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn scheduled_dates_are_exactly_closing_plus_offset() {
        let (db, _dir) = rekindle_test_utils::fresh_db().await;
        let agent = fixtures::agent("agent-1");
        rekindle_storage::queries::agents::insert_agent(&db, &agent)
            .await
            .unwrap();

        rekindle_test_utils::use_only_templates(
            &db,
            &[fixtures::template("t-7", 7, "Hi {{first_name}}!")],
        )
        .await;

        let client = fixtures::client(
            "client-1",
            &agent.id,
            "+15557654321",
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        );
        clients::insert_client(&db, &client).await.unwrap();

        schedule_for_client(&db, &client, &agent, now()).await.unwrap();

        let due = messages::due_messages(
            &db,
            Utc.with_ymd_and_hms(2026, 3, 8, 0, 0, 1).unwrap(),
            3,
            100,
        )
        .await
        .unwrap();
        assert_eq!(due.len(), 1);
        let message = &due[0].message;
        assert_eq!(
            message.scheduled_for,
            Utc.with_ymd_and_hms(2026, 3, 8, 0, 0, 0).unwrap()
        );
        assert_eq!(message.status, MessageStatus::Scheduled);
        // Body was personalized and carries the signature.
        assert!(message.body.starts_with("Hi Sam!"));
        assert!(message.body.contains(&agent.full_name()));

        db.close().await.unwrap();
    }
}
