// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Referral reads and writes.
//!
//! Referral pipeline management lives in the CRUD surface outside the
//! engine; the engine inserts new referrals and bumps the referring
//! client's engagement score.

use rekindle_core::RekindleError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{self, Referral};

const REFERRAL_COLUMNS: &str = "id, agent_id, referred_by_client_id, first_name, last_name, \
     phone, email, status, notes, contacted_at, converted_at, created_at, updated_at";

fn row_to_referral(row: &rusqlite::Row<'_>) -> Result<Referral, rusqlite::Error> {
    Ok(Referral {
        id: row.get(0)?,
        agent_id: row.get(1)?,
        referred_by_client_id: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        phone: row.get(5)?,
        email: row.get(6)?,
        status: models::enum_from_sql(&row.get::<_, String>(7)?)?,
        notes: row.get(8)?,
        contacted_at: models::opt_ts_from_sql(row.get(9)?)?,
        converted_at: models::opt_ts_from_sql(row.get(10)?)?,
        created_at: models::ts_from_sql(&row.get::<_, String>(11)?)?,
        updated_at: models::ts_from_sql(&row.get::<_, String>(12)?)?,
    })
}

/// Insert a new referral.
pub async fn insert_referral(db: &Database, referral: &Referral) -> Result<(), RekindleError> {
    let referral = referral.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO referrals (id, agent_id, referred_by_client_id, first_name, last_name,
                     phone, email, status, notes, contacted_at, converted_at, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    referral.id,
                    referral.agent_id,
                    referral.referred_by_client_id,
                    referral.first_name,
                    referral.last_name,
                    referral.phone,
                    referral.email,
                    referral.status.to_string(),
                    referral.notes,
                    referral.contacted_at.map(models::ts_to_sql),
                    referral.converted_at.map(models::ts_to_sql),
                    models::ts_to_sql(referral.created_at),
                    models::ts_to_sql(referral.updated_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Referrals attributed to one client, newest first.
pub async fn list_for_client(
    db: &Database,
    client_id: &str,
) -> Result<Vec<Referral>, RekindleError> {
    let client_id = client_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {REFERRAL_COLUMNS} FROM referrals
                 WHERE referred_by_client_id = ?1
                 ORDER BY created_at DESC"
            ))?;
            let rows = stmt.query_map(params![client_id], row_to_referral)?;
            let mut referrals = Vec::new();
            for row in rows {
                referrals.push(row?);
            }
            Ok(referrals)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
