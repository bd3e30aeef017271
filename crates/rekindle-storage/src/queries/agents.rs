// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent (tenant) lookups.

use rekindle_core::RekindleError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{self, Agent};

const AGENT_COLUMNS: &str = "id, email, first_name, last_name, phone_number, company_name, \
     subscription_tier, subscription_status, sms_from_number, is_active, created_at, updated_at";

fn row_to_agent(row: &rusqlite::Row<'_>) -> Result<Agent, rusqlite::Error> {
    Ok(Agent {
        id: row.get(0)?,
        email: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        phone_number: row.get(4)?,
        company_name: row.get(5)?,
        subscription_tier: models::enum_from_sql(&row.get::<_, String>(6)?)?,
        subscription_status: models::enum_from_sql(&row.get::<_, String>(7)?)?,
        sms_from_number: row.get(8)?,
        is_active: row.get(9)?,
        created_at: models::ts_from_sql(&row.get::<_, String>(10)?)?,
        updated_at: models::ts_from_sql(&row.get::<_, String>(11)?)?,
    })
}

/// Insert a new agent.
pub async fn insert_agent(db: &Database, agent: &Agent) -> Result<(), RekindleError> {
    let agent = agent.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO agents (id, email, first_name, last_name, phone_number, company_name,
                     subscription_tier, subscription_status, sms_from_number, is_active,
                     created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    agent.id,
                    agent.email,
                    agent.first_name,
                    agent.last_name,
                    agent.phone_number,
                    agent.company_name,
                    agent.subscription_tier.to_string(),
                    agent.subscription_status.to_string(),
                    agent.sms_from_number,
                    agent.is_active,
                    models::ts_to_sql(agent.created_at),
                    models::ts_to_sql(agent.updated_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Look up an agent by id.
pub async fn find_agent(db: &Database, id: &str) -> Result<Option<Agent>, RekindleError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {AGENT_COLUMNS} FROM agents WHERE id = ?1"))?;
            let mut rows = stmt.query_map(params![id], row_to_agent)?;
            Ok(rows.next().transpose()?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Resolve the owning agent of a provisioned sending number.
///
/// Each agent owns exactly one sending number (unique column), so this is
/// the tenant-resolution step for inbound webhooks.
pub async fn find_agent_by_sms_number(
    db: &Database,
    sms_number: &str,
) -> Result<Option<Agent>, RekindleError> {
    let sms_number = sms_number.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {AGENT_COLUMNS} FROM agents WHERE sms_from_number = ?1"
            ))?;
            let mut rows = stmt.query_map(params![sms_number], row_to_agent)?;
            Ok(rows.next().transpose()?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
