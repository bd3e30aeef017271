// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message persistence and the message state machine.
//!
//! Every status change goes through one of the guarded transition functions
//! below. Each is a single conditional UPDATE whose WHERE clause checks the
//! allowed prior status, so a transition either happens atomically or
//! affects zero rows. Racing callers observe the zero-row outcome and back
//! off; there is no read-then-write window anywhere in this module.

use chrono::{DateTime, Utc};
use rekindle_core::RekindleError;
use rekindle_core::types::MessageStatus;
use rusqlite::params;

use crate::database::Database;
use crate::models::{self, DueMessage, MessageRecord};

const MESSAGE_COLUMNS: &str = "id, client_id, agent_id, body, scheduled_for, sent_at, \
     delivered_at, status, provider_sid, reply_text, reply_at, is_read, failed_reason, \
     retry_count, created_at, updated_at";

// Alias-qualified copy for joined selects, same order as MESSAGE_COLUMNS.
const MESSAGE_COLUMNS_M: &str = "m.id, m.client_id, m.agent_id, m.body, m.scheduled_for, \
     m.sent_at, m.delivered_at, m.status, m.provider_sid, m.reply_text, m.reply_at, m.is_read, \
     m.failed_reason, m.retry_count, m.created_at, m.updated_at";

fn row_to_message(row: &rusqlite::Row<'_>) -> Result<MessageRecord, rusqlite::Error> {
    Ok(MessageRecord {
        id: row.get(0)?,
        client_id: row.get(1)?,
        agent_id: row.get(2)?,
        body: row.get(3)?,
        scheduled_for: models::ts_from_sql(&row.get::<_, String>(4)?)?,
        sent_at: models::opt_ts_from_sql(row.get(5)?)?,
        delivered_at: models::opt_ts_from_sql(row.get(6)?)?,
        status: models::enum_from_sql(&row.get::<_, String>(7)?)?,
        provider_sid: row.get(8)?,
        reply_text: row.get(9)?,
        reply_at: models::opt_ts_from_sql(row.get(10)?)?,
        is_read: row.get(11)?,
        failed_reason: row.get(12)?,
        retry_count: row.get(13)?,
        created_at: models::ts_from_sql(&row.get::<_, String>(14)?)?,
        updated_at: models::ts_from_sql(&row.get::<_, String>(15)?)?,
    })
}

/// Insert a new message.
pub async fn insert_message(db: &Database, msg: &MessageRecord) -> Result<(), RekindleError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (id, client_id, agent_id, body, scheduled_for, sent_at,
                     delivered_at, status, provider_sid, reply_text, reply_at, is_read,
                     failed_reason, retry_count, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                params![
                    msg.id,
                    msg.client_id,
                    msg.agent_id,
                    msg.body,
                    models::ts_to_sql(msg.scheduled_for),
                    msg.sent_at.map(models::ts_to_sql),
                    msg.delivered_at.map(models::ts_to_sql),
                    msg.status.to_string(),
                    msg.provider_sid,
                    msg.reply_text,
                    msg.reply_at.map(models::ts_to_sql),
                    msg.is_read,
                    msg.failed_reason,
                    msg.retry_count,
                    models::ts_to_sql(msg.created_at),
                    models::ts_to_sql(msg.updated_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Look up a message by id.
pub async fn find_message(db: &Database, id: &str) -> Result<Option<MessageRecord>, RekindleError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"))?;
            let mut rows = stmt.query_map(params![id], row_to_message)?;
            Ok(rows.next().transpose()?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Due messages eligible for a dispatch sweep.
///
/// A message is due when it is still `scheduled`, its send time has passed,
/// it has retry budget left, and both the client and the agent's
/// subscription are active. Ordered oldest first and capped at `batch_size`
/// to bound sweep latency; anything beyond the cap is picked up by the next
/// sweep.
pub async fn due_messages(
    db: &Database,
    now: DateTime<Utc>,
    max_retries: u32,
    batch_size: u32,
) -> Result<Vec<DueMessage>, RekindleError> {
    let now = models::ts_to_sql(now);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS_M}, c.phone_number, a.sms_from_number
                 FROM messages m
                 JOIN clients c ON c.id = m.client_id
                 JOIN agents a ON a.id = m.agent_id
                 WHERE m.status = 'scheduled' AND m.scheduled_for <= ?1
                   AND m.retry_count < ?2
                   AND c.is_active = 1 AND a.is_active = 1
                   AND a.subscription_status = 'active'
                 ORDER BY m.scheduled_for ASC
                 LIMIT ?3",
            ))?;
            let rows = stmt.query_map(params![now, max_retries, batch_size], |row| {
                Ok(DueMessage {
                    message: row_to_message(row)?,
                    client_phone: row.get(16)?,
                    agent_from_number: row.get(17)?,
                })
            })?;
            let mut due = Vec::new();
            for row in rows {
                due.push(row?);
            }
            Ok(due)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Claim a message for delivery: `scheduled -> sending`.
///
/// This is the at-most-once guard. When two sweep workers race on the same
/// row, the conditional UPDATE succeeds for exactly one of them; the loser
/// sees `false` and must skip the message.
pub async fn claim_for_sending(
    db: &Database,
    id: &str,
    now: DateTime<Utc>,
) -> Result<bool, RekindleError> {
    let id = id.to_string();
    let now = models::ts_to_sql(now);
    db.connection()
        .call(move |conn| {
            let affected = conn.execute(
                "UPDATE messages SET status = 'sending', updated_at = ?2
                 WHERE id = ?1 AND status = 'scheduled'",
                params![id, now],
            )?;
            Ok(affected == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record a successful delivery attempt: `sending -> sent`.
pub async fn mark_sent(
    db: &Database,
    id: &str,
    provider_sid: &str,
    now: DateTime<Utc>,
) -> Result<bool, RekindleError> {
    let id = id.to_string();
    let provider_sid = provider_sid.to_string();
    let now = models::ts_to_sql(now);
    db.connection()
        .call(move |conn| {
            let affected = conn.execute(
                "UPDATE messages SET status = 'sent', provider_sid = ?2, sent_at = ?3,
                     updated_at = ?3
                 WHERE id = ?1 AND status = 'sending'",
                params![id, provider_sid, now],
            )?;
            Ok(affected == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record a failed delivery attempt.
///
/// Increments the retry counter; while the post-increment count is below
/// `max_retries` the message reverts to `scheduled` for the next sweep,
/// otherwise it fails terminally with the reason recorded. Both outcomes are
/// a single atomic UPDATE. Returns the resulting status, or `None` when the
/// message was not in `sending`.
pub async fn record_attempt_failure(
    db: &Database,
    id: &str,
    reason: &str,
    max_retries: u32,
    now: DateTime<Utc>,
) -> Result<Option<MessageStatus>, RekindleError> {
    let id = id.to_string();
    let reason = reason.to_string();
    let now = models::ts_to_sql(now);
    db.connection()
        .call(move |conn| {
            let affected = conn.execute(
                "UPDATE messages SET
                     retry_count = retry_count + 1,
                     status = CASE WHEN retry_count + 1 >= ?3 THEN 'failed' ELSE 'scheduled' END,
                     failed_reason = CASE WHEN retry_count + 1 >= ?3 THEN ?2 ELSE failed_reason END,
                     updated_at = ?4
                 WHERE id = ?1 AND status = 'sending'",
                params![id, reason, max_retries, now],
            )?;
            if affected == 0 {
                return Ok(None);
            }
            let status: String = conn.query_row(
                "SELECT status FROM messages WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )?;
            Ok(Some(models::enum_from_sql(&status)?))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fail a message permanently: `sending -> failed`.
///
/// Used when no delivery capability exists for the owning agent. The retry
/// counter still increments so the attempt is visible in reporting.
pub async fn mark_failed(
    db: &Database,
    id: &str,
    reason: &str,
    now: DateTime<Utc>,
) -> Result<bool, RekindleError> {
    let id = id.to_string();
    let reason = reason.to_string();
    let now = models::ts_to_sql(now);
    db.connection()
        .call(move |conn| {
            let affected = conn.execute(
                "UPDATE messages SET status = 'failed', failed_reason = ?2,
                     retry_count = retry_count + 1, updated_at = ?3
                 WHERE id = ?1 AND status = 'sending'",
                params![id, reason, now],
            )?;
            Ok(affected == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Apply a delivery receipt: `sent -> delivered`, keyed by provider sid.
pub async fn mark_delivered_by_sid(
    db: &Database,
    provider_sid: &str,
    now: DateTime<Utc>,
) -> Result<bool, RekindleError> {
    let provider_sid = provider_sid.to_string();
    let now = models::ts_to_sql(now);
    db.connection()
        .call(move |conn| {
            let affected = conn.execute(
                "UPDATE messages SET status = 'delivered', delivered_at = ?2, updated_at = ?2
                 WHERE provider_sid = ?1 AND status = 'sent'",
                params![provider_sid, now],
            )?;
            Ok(affected == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The most recent outbound message to a client, by `sent_at` descending.
///
/// This is the row an inbound reply correlates to.
pub async fn find_recent_sent_for_client(
    db: &Database,
    client_id: &str,
) -> Result<Option<MessageRecord>, RekindleError> {
    let client_id = client_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE client_id = ?1 AND status IN ('sent', 'delivered')
                 ORDER BY sent_at DESC
                 LIMIT 1"
            ))?;
            let mut rows = stmt.query_map(params![client_id], row_to_message)?;
            Ok(rows.next().transpose()?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Attach an inbound reply: `sent|delivered -> replied`.
pub async fn mark_replied(
    db: &Database,
    id: &str,
    reply_text: &str,
    now: DateTime<Utc>,
) -> Result<bool, RekindleError> {
    let id = id.to_string();
    let reply_text = reply_text.to_string();
    let now = models::ts_to_sql(now);
    db.connection()
        .call(move |conn| {
            let affected = conn.execute(
                "UPDATE messages SET status = 'replied', reply_text = ?2, reply_at = ?3,
                     is_read = 0, updated_at = ?3
                 WHERE id = ?1 AND status IN ('sent', 'delivered')",
                params![id, reply_text, now],
            )?;
            Ok(affected == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark a reply as read by the agent.
pub async fn mark_read(db: &Database, id: &str, now: DateTime<Utc>) -> Result<bool, RekindleError> {
    let id = id.to_string();
    let now = models::ts_to_sql(now);
    db.connection()
        .call(move |conn| {
            let affected = conn.execute(
                "UPDATE messages SET is_read = 1, updated_at = ?2 WHERE id = ?1",
                params![id, now],
            )?;
            Ok(affected == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Edit the body of a not-yet-dispatched message.
///
/// Permitted only while `scheduled`; once a message has been claimed its
/// content is frozen.
pub async fn update_body(
    db: &Database,
    id: &str,
    body: &str,
    now: DateTime<Utc>,
) -> Result<bool, RekindleError> {
    let id = id.to_string();
    let body = body.to_string();
    let now = models::ts_to_sql(now);
    db.connection()
        .call(move |conn| {
            let affected = conn.execute(
                "UPDATE messages SET body = ?2, updated_at = ?3
                 WHERE id = ?1 AND status = 'scheduled'",
                params![id, body, now],
            )?;
            Ok(affected == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Cancel a single message: `scheduled -> cancelled`.
pub async fn cancel(db: &Database, id: &str, now: DateTime<Utc>) -> Result<bool, RekindleError> {
    let id = id.to_string();
    let now = models::ts_to_sql(now);
    db.connection()
        .call(move |conn| {
            let affected = conn.execute(
                "UPDATE messages SET status = 'cancelled', updated_at = ?2
                 WHERE id = ?1 AND status = 'scheduled'",
                params![id, now],
            )?;
            Ok(affected == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Cancel every still-scheduled message for a client.
///
/// Cascade for client removal and opt-out. In-flight (`sending`) attempts
/// are left to finish to their natural terminal state. Returns the number
/// of messages cancelled, which is zero on repeat calls.
pub async fn cancel_scheduled_for_client(
    db: &Database,
    client_id: &str,
    now: DateTime<Utc>,
) -> Result<u64, RekindleError> {
    let client_id = client_id.to_string();
    let now = models::ts_to_sql(now);
    db.connection()
        .call(move |conn| {
            let affected = conn.execute(
                "UPDATE messages SET status = 'cancelled', updated_at = ?2
                 WHERE client_id = ?1 AND status = 'scheduled'",
                params![client_id, now],
            )?;
            Ok(affected as u64)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Requeue messages stuck in `sending` since before `cutoff`.
///
/// A crash between claim and completion would otherwise leave the row in
/// `sending` forever. The sweep runs this first with a cutoff comfortably
/// past the attempt timeout, so only genuinely abandoned claims move back
/// to `scheduled`.
pub async fn reclaim_stale_sending(
    db: &Database,
    cutoff: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<u64, RekindleError> {
    let cutoff = models::ts_to_sql(cutoff);
    let now = models::ts_to_sql(now);
    db.connection()
        .call(move |conn| {
            let affected = conn.execute(
                "UPDATE messages SET status = 'scheduled', updated_at = ?2
                 WHERE status = 'sending' AND updated_at < ?1",
                params![cutoff, now],
            )?;
            Ok(affected as u64)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Number of replies a client has sent, for engagement recomputation.
pub async fn reply_count_for_client(db: &Database, client_id: &str) -> Result<u32, RekindleError> {
    let client_id = client_id.to_string();
    db.connection()
        .call(move |conn| {
            let count: u32 = conn.query_row(
                "SELECT COUNT(*) FROM messages WHERE client_id = ?1 AND status = 'replied'",
                params![client_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Agent, Client, SubscriptionStatus, SubscriptionTier};
    use crate::queries::{agents, clients};
    use chrono::{NaiveDate, TimeZone};
    use tempfile::tempdir;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn test_agent(id: &str, from_number: Option<&str>) -> Agent {
        Agent {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            first_name: "Dana".to_string(),
            last_name: "Reyes".to_string(),
            phone_number: "+15550000001".to_string(),
            company_name: Some("Reyes Realty".to_string()),
            subscription_tier: SubscriptionTier::Professional,
            subscription_status: SubscriptionStatus::Active,
            sms_from_number: from_number.map(str::to_string),
            is_active: true,
            created_at: t0(),
            updated_at: t0(),
        }
    }

    fn test_client(id: &str, agent_id: &str, phone: &str) -> Client {
        Client {
            id: id.to_string(),
            agent_id: agent_id.to_string(),
            first_name: "Sam".to_string(),
            last_name: "Okafor".to_string(),
            phone_number: phone.to_string(),
            email: None,
            property_address: None,
            city: Some("Austin".to_string()),
            state: Some("TX".to_string()),
            zip: None,
            property_type: None,
            closing_date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            notes: None,
            engagement_score: 50,
            is_active: true,
            created_at: t0(),
            updated_at: t0(),
        }
    }

    fn test_message(id: &str, client: &Client, scheduled_for: DateTime<Utc>) -> MessageRecord {
        let mut msg = MessageRecord::scheduled(client, format!("body of {id}"), scheduled_for, t0());
        msg.id = id.to_string();
        msg
    }

    async fn setup() -> (Database, tempfile::TempDir, Client) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        let agent = test_agent("agent-1", Some("+15551230000"));
        agents::insert_agent(&db, &agent).await.unwrap();
        let client = test_client("client-1", "agent-1", "+15557654321");
        clients::insert_client(&db, &client).await.unwrap();
        (db, dir, client)
    }

    #[tokio::test]
    async fn claim_succeeds_exactly_once() {
        let (db, _dir, client) = setup().await;
        let msg = test_message("m1", &client, t0());
        insert_message(&db, &msg).await.unwrap();

        assert!(claim_for_sending(&db, &msg.id, t0()).await.unwrap());
        // A second claim races against an already-claimed row and loses.
        assert!(!claim_for_sending(&db, &msg.id, t0()).await.unwrap());

        let row = find_message(&db, &msg.id).await.unwrap().unwrap();
        assert_eq!(row.status, MessageStatus::Sending);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn sent_requires_prior_claim() {
        let (db, _dir, client) = setup().await;
        let msg = test_message("m1", &client, t0());
        insert_message(&db, &msg).await.unwrap();

        // scheduled -> sent skips sending and must be rejected.
        assert!(!mark_sent(&db, &msg.id, "SM1", t0()).await.unwrap());

        assert!(claim_for_sending(&db, &msg.id, t0()).await.unwrap());
        assert!(mark_sent(&db, &msg.id, "SM1", t0()).await.unwrap());

        let row = find_message(&db, &msg.id).await.unwrap().unwrap();
        assert_eq!(row.status, MessageStatus::Sent);
        assert_eq!(row.provider_sid.as_deref(), Some("SM1"));
        assert!(row.sent_at.is_some());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn attempt_failure_requeues_until_ceiling() {
        let (db, _dir, client) = setup().await;
        let msg = test_message("m1", &client, t0());
        insert_message(&db, &msg).await.unwrap();

        // Attempts 1 and 2 requeue.
        for expected_retry in 1..=2 {
            assert!(claim_for_sending(&db, &msg.id, t0()).await.unwrap());
            let status = record_attempt_failure(&db, &msg.id, "provider 500", 3, t0())
                .await
                .unwrap();
            assert_eq!(status, Some(MessageStatus::Scheduled));
            let row = find_message(&db, &msg.id).await.unwrap().unwrap();
            assert_eq!(row.retry_count, expected_retry);
            assert!(row.failed_reason.is_none());
        }

        // Attempt 3 exhausts the budget and fails terminally.
        assert!(claim_for_sending(&db, &msg.id, t0()).await.unwrap());
        let status = record_attempt_failure(&db, &msg.id, "provider 500", 3, t0())
            .await
            .unwrap();
        assert_eq!(status, Some(MessageStatus::Failed));

        let row = find_message(&db, &msg.id).await.unwrap().unwrap();
        assert_eq!(row.retry_count, 3);
        assert_eq!(row.failed_reason.as_deref(), Some("provider 500"));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn attempt_failure_requires_sending_state() {
        let (db, _dir, client) = setup().await;
        let msg = test_message("m1", &client, t0());
        insert_message(&db, &msg).await.unwrap();

        let status = record_attempt_failure(&db, &msg.id, "oops", 3, t0())
            .await
            .unwrap();
        assert_eq!(status, None);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn due_messages_respects_predicate_and_order() {
        let (db, _dir, client) = setup().await;
        let now = t0();

        let past1 = test_message("m-past-1", &client, now - chrono::Duration::hours(2));
        let past2 = test_message("m-past-2", &client, now - chrono::Duration::hours(1));
        let future = test_message("m-future", &client, now + chrono::Duration::hours(1));
        // Inserted newest-first to prove ordering comes from scheduled_for.
        insert_message(&db, &future).await.unwrap();
        insert_message(&db, &past2).await.unwrap();
        insert_message(&db, &past1).await.unwrap();

        let due = due_messages(&db, now, 3, 100).await.unwrap();
        let ids: Vec<&str> = due.iter().map(|d| d.message.id.as_str()).collect();
        assert_eq!(ids, vec!["m-past-1", "m-past-2"]);
        assert_eq!(due[0].client_phone, client.phone_number);
        assert_eq!(due[0].agent_from_number.as_deref(), Some("+15551230000"));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn due_messages_excludes_inactive_client_and_lapsed_agent() {
        let (db, _dir, client) = setup().await;
        let now = t0();

        // Second agent with a lapsed subscription.
        let mut lapsed = test_agent("agent-2", Some("+15551239999"));
        lapsed.subscription_status = SubscriptionStatus::PastDue;
        agents::insert_agent(&db, &lapsed).await.unwrap();
        let lapsed_client = test_client("client-2", "agent-2", "+15557650000");
        clients::insert_client(&db, &lapsed_client).await.unwrap();

        let m1 = test_message("m1", &client, now - chrono::Duration::hours(1));
        let m2 = test_message("m2", &lapsed_client, now - chrono::Duration::hours(1));
        insert_message(&db, &m1).await.unwrap();
        insert_message(&db, &m2).await.unwrap();

        let due = due_messages(&db, now, 3, 100).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].message.id, "m1");

        // Deactivating the remaining client empties the sweep.
        clients::deactivate(&db, &client.id, now).await.unwrap();
        let due = due_messages(&db, now, 3, 100).await.unwrap();
        assert!(due.is_empty());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn due_messages_caps_batch_size() {
        let (db, _dir, client) = setup().await;
        let now = t0();

        for i in 0..5 {
            let msg = test_message(
                &format!("m{i}"),
                &client,
                now - chrono::Duration::minutes(10 - i),
            );
            insert_message(&db, &msg).await.unwrap();
        }

        let due = due_messages(&db, now, 3, 2).await.unwrap();
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].message.id, "m0");
        assert_eq!(due[1].message.id, "m1");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn replied_requires_sent_or_delivered() {
        let (db, _dir, client) = setup().await;
        let msg = test_message("m1", &client, t0());
        insert_message(&db, &msg).await.unwrap();

        assert!(!mark_replied(&db, &msg.id, "hi", t0()).await.unwrap());

        claim_for_sending(&db, &msg.id, t0()).await.unwrap();
        mark_sent(&db, &msg.id, "SM1", t0()).await.unwrap();
        assert!(mark_replied(&db, &msg.id, "Sounds great!", t0()).await.unwrap());

        let row = find_message(&db, &msg.id).await.unwrap().unwrap();
        assert_eq!(row.status, MessageStatus::Replied);
        assert_eq!(row.reply_text.as_deref(), Some("Sounds great!"));
        assert!(!row.is_read);

        // The agent opening the reply flips the read flag without a status change.
        assert!(mark_read(&db, &msg.id, t0()).await.unwrap());
        let row = find_message(&db, &msg.id).await.unwrap().unwrap();
        assert!(row.is_read);
        assert_eq!(row.status, MessageStatus::Replied);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delivery_receipt_upgrades_sent_only() {
        let (db, _dir, client) = setup().await;
        let msg = test_message("m1", &client, t0());
        insert_message(&db, &msg).await.unwrap();

        // Unknown sid, nothing to update.
        assert!(!mark_delivered_by_sid(&db, "SM1", t0()).await.unwrap());

        claim_for_sending(&db, &msg.id, t0()).await.unwrap();
        mark_sent(&db, &msg.id, "SM1", t0()).await.unwrap();
        assert!(mark_delivered_by_sid(&db, "SM1", t0()).await.unwrap());

        let row = find_message(&db, &msg.id).await.unwrap().unwrap();
        assert_eq!(row.status, MessageStatus::Delivered);
        assert!(row.delivered_at.is_some());

        // Receipt replay is a no-op.
        assert!(!mark_delivered_by_sid(&db, "SM1", t0()).await.unwrap());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn cancel_cascade_touches_only_scheduled() {
        let (db, _dir, client) = setup().await;
        let m1 = test_message("m1", &client, t0());
        let m2 = test_message("m2", &client, t0());
        let m3 = test_message("m3", &client, t0());
        insert_message(&db, &m1).await.unwrap();
        insert_message(&db, &m2).await.unwrap();
        insert_message(&db, &m3).await.unwrap();

        // m3 is already in flight.
        claim_for_sending(&db, &m3.id, t0()).await.unwrap();

        let cancelled = cancel_scheduled_for_client(&db, &client.id, t0())
            .await
            .unwrap();
        assert_eq!(cancelled, 2);

        let row = find_message(&db, &m3.id).await.unwrap().unwrap();
        assert_eq!(row.status, MessageStatus::Sending, "in-flight rows finish naturally");

        // Second cascade has nothing left to do.
        let cancelled = cancel_scheduled_for_client(&db, &client.id, t0())
            .await
            .unwrap();
        assert_eq!(cancelled, 0);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn body_edits_frozen_after_claim() {
        let (db, _dir, client) = setup().await;
        let msg = test_message("m1", &client, t0());
        insert_message(&db, &msg).await.unwrap();

        assert!(update_body(&db, &msg.id, "new text", t0()).await.unwrap());

        claim_for_sending(&db, &msg.id, t0()).await.unwrap();
        assert!(!update_body(&db, &msg.id, "too late", t0()).await.unwrap());

        let row = find_message(&db, &msg.id).await.unwrap().unwrap();
        assert_eq!(row.body, "new text");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn stale_sending_rows_are_reclaimed() {
        let (db, _dir, client) = setup().await;
        let now = t0();
        let msg = test_message("m1", &client, now);
        insert_message(&db, &msg).await.unwrap();

        // Claimed twenty minutes ago, never completed.
        claim_for_sending(&db, &msg.id, now - chrono::Duration::minutes(20))
            .await
            .unwrap();

        let reclaimed = reclaim_stale_sending(&db, now - chrono::Duration::minutes(5), now)
            .await
            .unwrap();
        assert_eq!(reclaimed, 1);

        let row = find_message(&db, &msg.id).await.unwrap().unwrap();
        assert_eq!(row.status, MessageStatus::Scheduled);

        // A fresh claim is not stale and stays put.
        claim_for_sending(&db, &msg.id, now).await.unwrap();
        let reclaimed = reclaim_stale_sending(&db, now - chrono::Duration::minutes(5), now)
            .await
            .unwrap();
        assert_eq!(reclaimed, 0);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reply_count_counts_replied_only() {
        let (db, _dir, client) = setup().await;
        let m1 = test_message("m1", &client, t0());
        let m2 = test_message("m2", &client, t0());
        insert_message(&db, &m1).await.unwrap();
        insert_message(&db, &m2).await.unwrap();

        claim_for_sending(&db, &m1.id, t0()).await.unwrap();
        mark_sent(&db, &m1.id, "SM1", t0()).await.unwrap();
        mark_replied(&db, &m1.id, "yes!", t0()).await.unwrap();

        assert_eq!(reply_count_for_client(&db, &client.id).await.unwrap(), 1);

        db.close().await.unwrap();
    }
}
