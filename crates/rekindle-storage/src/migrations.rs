// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded database migrations using refinery.
//!
//! SQL migration files are compiled into the binary at build time via
//! `embed_migrations!`. Migrations run automatically on database open.

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Run all pending migrations against the given connection.
///
/// Refinery tracks applied migrations in its own `refinery_schema_history`
/// table. Returns a rusqlite-compatible error so this can run inside a
/// `connection().call(...)` closure.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), rusqlite::Error> {
    embedded::migrations::runner().run(conn).map_err(|e| {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
            Some(format!("migration failed: {e}")),
        )
    })?;
    Ok(())
}
