// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `rekindle init-db` command implementation.
//!
//! Opening the database applies migrations and the template seed; this
//! command exists so operators can do that ahead of first serve.

use rekindle_config::RekindleConfig;
use rekindle_core::RekindleError;
use rekindle_storage::Database;
use rekindle_storage::queries::templates;
use tracing::info;

/// Runs the `rekindle init-db` command.
pub async fn run_init_db(config: RekindleConfig) -> Result<(), RekindleError> {
    info!(
        path = config.storage.database_path.as_str(),
        "initializing database"
    );

    let db = Database::open(&config.storage.database_path).await?;
    let active = templates::list_active(&db).await?;
    info!(templates = active.len(), "database ready");

    db.close().await
}
