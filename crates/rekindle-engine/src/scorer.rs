// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic engagement score recomputation.
//!
//! The batch formula is the source of truth: `50 + 10 per reply`, clamped
//! to 0-100. The correlator's incremental bump keeps scores fresh between
//! passes and is overwritten here on the next run.

use chrono::{DateTime, Utc};
use rekindle_core::RekindleError;
use rekindle_storage::Database;
use rekindle_storage::queries::{clients, messages};
use tracing::info;

/// Recompute engagement for every active client.
///
/// Idempotent and order-independent; writes only when the computed score
/// differs from the stored one. Returns the number of clients updated.
pub async fn run_scoring_pass(db: &Database, now: DateTime<Utc>) -> Result<usize, RekindleError> {
    let active = clients::list_active(db).await?;

    let mut updated = 0;
    for client in &active {
        let replies = messages::reply_count_for_client(db, &client.id).await?;
        let score = (50 + 10 * replies as i64).clamp(0, 100);

        if score != client.engagement_score {
            clients::set_engagement(db, &client.id, score, now).await?;
            updated += 1;
        }
    }

    info!(
        clients = active.len(),
        updated, "engagement scoring pass complete"
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use rekindle_core::types::{MessageRecord, MessageStatus};
    use rekindle_test_utils::fixtures;
    use rekindle_test_utils::fresh_db;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    async fn seed_replies(db: &Database, client_id: &str, count: usize) {
        let client = fixtures::client(
            client_id,
            "agent-1",
            "+15557654321",
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        );
        for i in 0..count {
            let mut message = MessageRecord::scheduled(
                &client,
                format!("msg {i}"),
                now() - chrono::Duration::days(i as i64 + 1),
                now() - chrono::Duration::days(30),
            );
            message.id = format!("{client_id}-m{i}");
            message.status = MessageStatus::Replied;
            rekindle_storage::queries::messages::insert_message(db, &message)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn score_is_fifty_plus_ten_per_reply() {
        let (db, _dir) = fresh_db().await;
        let agent = fixtures::agent("agent-1");
        rekindle_storage::queries::agents::insert_agent(&db, &agent)
            .await
            .unwrap();
        let client = fixtures::client(
            "client-1",
            "agent-1",
            "+15557654321",
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        );
        rekindle_storage::queries::clients::insert_client(&db, &client)
            .await
            .unwrap();
        seed_replies(&db, "client-1", 3).await;

        let updated = run_scoring_pass(&db, now()).await.unwrap();
        assert_eq!(updated, 1);

        let row = rekindle_storage::queries::clients::find_client(&db, "client-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.engagement_score, 80);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn score_clamps_at_100() {
        let (db, _dir) = fresh_db().await;
        let agent = fixtures::agent("agent-1");
        rekindle_storage::queries::agents::insert_agent(&db, &agent)
            .await
            .unwrap();
        let client = fixtures::client(
            "client-1",
            "agent-1",
            "+15557654321",
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        );
        rekindle_storage::queries::clients::insert_client(&db, &client)
            .await
            .unwrap();
        // 20 replies would naively score 250.
        seed_replies(&db, "client-1", 20).await;

        run_scoring_pass(&db, now()).await.unwrap();

        let row = rekindle_storage::queries::clients::find_client(&db, "client-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.engagement_score, 100);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn unchanged_scores_are_not_rewritten() {
        let (db, _dir) = fresh_db().await;
        let agent = fixtures::agent("agent-1");
        rekindle_storage::queries::agents::insert_agent(&db, &agent)
            .await
            .unwrap();
        let client = fixtures::client(
            "client-1",
            "agent-1",
            "+15557654321",
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        );
        rekindle_storage::queries::clients::insert_client(&db, &client)
            .await
            .unwrap();

        // No replies: the default 50 is already correct.
        let updated = run_scoring_pass(&db, now()).await.unwrap();
        assert_eq!(updated, 0);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn batch_overwrites_incremental_drift() {
        let (db, _dir) = fresh_db().await;
        let agent = fixtures::agent("agent-1");
        rekindle_storage::queries::agents::insert_agent(&db, &agent)
            .await
            .unwrap();
        let client = fixtures::client(
            "client-1",
            "agent-1",
            "+15557654321",
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        );
        rekindle_storage::queries::clients::insert_client(&db, &client)
            .await
            .unwrap();
        seed_replies(&db, "client-1", 1).await;

        // Incremental bumps pushed the stored score past the formula.
        rekindle_storage::queries::clients::set_engagement(&db, "client-1", 90, now())
            .await
            .unwrap();

        run_scoring_pass(&db, now()).await.unwrap();

        let row = rekindle_storage::queries::clients::find_client(&db, "client-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.engagement_score, 60, "batch recomputation wins");

        db.close().await.unwrap();
    }
}
