// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Template reads. Templates are provisioned by the seed migration and are
//! read-only relative to the engine.

use rekindle_core::RekindleError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{self, Template};

const TEMPLATE_COLUMNS: &str = "id, name, trigger_days_after_closing, body, is_active, created_at";

fn row_to_template(row: &rusqlite::Row<'_>) -> Result<Template, rusqlite::Error> {
    Ok(Template {
        id: row.get(0)?,
        name: row.get(1)?,
        trigger_days_after_closing: row.get(2)?,
        body: row.get(3)?,
        is_active: row.get(4)?,
        created_at: models::ts_from_sql(&row.get::<_, String>(5)?)?,
    })
}

/// Active templates ordered by trigger offset ascending.
pub async fn list_active(db: &Database) -> Result<Vec<Template>, RekindleError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TEMPLATE_COLUMNS} FROM templates
                 WHERE is_active = 1
                 ORDER BY trigger_days_after_closing ASC"
            ))?;
            let rows = stmt.query_map([], row_to_template)?;
            let mut templates = Vec::new();
            for row in rows {
                templates.push(row?);
            }
            Ok(templates)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert a template. Used by fixtures and provisioning scripts, not the
/// engine itself.
pub async fn insert_template(db: &Database, template: &Template) -> Result<(), RekindleError> {
    let template = template.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO templates (id, name, trigger_days_after_closing, body, is_active, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    template.id,
                    template.name,
                    template.trigger_days_after_closing,
                    template.body,
                    template.is_active,
                    models::ts_to_sql(template.created_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Deactivate every template, clearing the way for custom fixtures.
pub async fn deactivate_all(db: &Database) -> Result<u64, RekindleError> {
    db.connection()
        .call(move |conn| {
            let affected = conn.execute("UPDATE templates SET is_active = 0", [])?;
            Ok(affected as u64)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
