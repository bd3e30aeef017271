// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client CRUD and engagement-score updates.

use chrono::{DateTime, Utc};
use rekindle_core::RekindleError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{self, Client};

const CLIENT_COLUMNS: &str = "id, agent_id, first_name, last_name, phone_number, email, \
     property_address, city, state, zip, property_type, closing_date, notes, \
     engagement_score, is_active, created_at, updated_at";

fn row_to_client(row: &rusqlite::Row<'_>) -> Result<Client, rusqlite::Error> {
    let property_type = row
        .get::<_, Option<String>>(10)?
        .as_deref()
        .map(models::enum_from_sql)
        .transpose()?;
    Ok(Client {
        id: row.get(0)?,
        agent_id: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        phone_number: row.get(4)?,
        email: row.get(5)?,
        property_address: row.get(6)?,
        city: row.get(7)?,
        state: row.get(8)?,
        zip: row.get(9)?,
        property_type,
        closing_date: models::date_from_sql(&row.get::<_, String>(11)?)?,
        notes: row.get(12)?,
        engagement_score: row.get(13)?,
        is_active: row.get(14)?,
        created_at: models::ts_from_sql(&row.get::<_, String>(15)?)?,
        updated_at: models::ts_from_sql(&row.get::<_, String>(16)?)?,
    })
}

/// Insert a new client.
pub async fn insert_client(db: &Database, client: &Client) -> Result<(), RekindleError> {
    let client = client.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO clients (id, agent_id, first_name, last_name, phone_number, email,
                     property_address, city, state, zip, property_type, closing_date, notes,
                     engagement_score, is_active, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
                params![
                    client.id,
                    client.agent_id,
                    client.first_name,
                    client.last_name,
                    client.phone_number,
                    client.email,
                    client.property_address,
                    client.city,
                    client.state,
                    client.zip,
                    client.property_type.map(|t| t.to_string()),
                    models::date_to_sql(client.closing_date),
                    client.notes,
                    client.engagement_score,
                    client.is_active,
                    models::ts_to_sql(client.created_at),
                    models::ts_to_sql(client.updated_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Look up a client by id.
pub async fn find_client(db: &Database, id: &str) -> Result<Option<Client>, RekindleError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?1"))?;
            let mut rows = stmt.query_map(params![id], row_to_client)?;
            Ok(rows.next().transpose()?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Look up a client by id within one agent's tenancy.
///
/// Tenant isolation: a client belonging to another agent is reported as
/// absent, never as someone else's data.
pub async fn find_for_agent(
    db: &Database,
    id: &str,
    agent_id: &str,
) -> Result<Option<Client>, RekindleError> {
    let id = id.to_string();
    let agent_id = agent_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?1 AND agent_id = ?2"
            ))?;
            let mut rows = stmt.query_map(params![id, agent_id], row_to_client)?;
            Ok(rows.next().transpose()?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Resolve an active client by phone number within one agent's tenancy.
///
/// The same phone number may belong to different clients of different
/// agents; resolution must always be scoped by agent.
pub async fn find_active_by_phone(
    db: &Database,
    agent_id: &str,
    phone: &str,
) -> Result<Option<Client>, RekindleError> {
    let agent_id = agent_id.to_string();
    let phone = phone.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CLIENT_COLUMNS} FROM clients
                 WHERE agent_id = ?1 AND phone_number = ?2 AND is_active = 1"
            ))?;
            let mut rows = stmt.query_map(params![agent_id, phone], row_to_client)?;
            Ok(rows.next().transpose()?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All active clients, for the engagement scoring pass.
pub async fn list_active(db: &Database) -> Result<Vec<Client>, RekindleError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CLIENT_COLUMNS} FROM clients WHERE is_active = 1 ORDER BY created_at ASC"
            ))?;
            let rows = stmt.query_map([], row_to_client)?;
            let mut clients = Vec::new();
            for row in rows {
                clients.push(row?);
            }
            Ok(clients)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Count active clients owned by an agent, for tier capacity checks.
pub async fn count_active_for_agent(db: &Database, agent_id: &str) -> Result<u32, RekindleError> {
    let agent_id = agent_id.to_string();
    db.connection()
        .call(move |conn| {
            let count: u32 = conn.query_row(
                "SELECT COUNT(*) FROM clients WHERE agent_id = ?1 AND is_active = 1",
                params![agent_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Soft-delete a client (explicit removal or opt-out reply).
///
/// Returns `false` when the client was already inactive, making repeated
/// opt-outs a no-op.
pub async fn deactivate(
    db: &Database,
    id: &str,
    now: DateTime<Utc>,
) -> Result<bool, RekindleError> {
    let id = id.to_string();
    let now = models::ts_to_sql(now);
    db.connection()
        .call(move |conn| {
            let affected = conn.execute(
                "UPDATE clients SET is_active = 0, updated_at = ?2
                 WHERE id = ?1 AND is_active = 1",
                params![id, now],
            )?;
            Ok(affected == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Add `delta` to a client's engagement score, capping at 100.
pub async fn bump_engagement(
    db: &Database,
    id: &str,
    delta: i64,
    now: DateTime<Utc>,
) -> Result<(), RekindleError> {
    let id = id.to_string();
    let now = models::ts_to_sql(now);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE clients
                 SET engagement_score = MAX(0, MIN(100, engagement_score + ?2)), updated_at = ?3
                 WHERE id = ?1",
                params![id, delta, now],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Overwrite a client's engagement score with a recomputed value.
pub async fn set_engagement(
    db: &Database,
    id: &str,
    score: i64,
    now: DateTime<Utc>,
) -> Result<(), RekindleError> {
    let id = id.to_string();
    let score = score.clamp(0, 100);
    let now = models::ts_to_sql(now);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE clients SET engagement_score = ?2, updated_at = ?3 WHERE id = ?1",
                params![id, score, now],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
