// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. The claim transition in `queries::messages` relies on this: a
//! conditional UPDATE is a single atomic operation, never read-then-write.
//! Do NOT create additional Connection instances for writes.

use rekindle_core::RekindleError;
use tracing::debug;

use crate::migrations;

/// Handle to the WAL-mode SQLite database. Cheap to clone; all clones share
/// the single writer thread.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path`, apply PRAGMAs, and run any
    /// pending migrations.
    pub async fn open(path: &str) -> Result<Self, RekindleError> {
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| map_tr_err(e.into()))?;

        conn.call(|conn| {
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.pragma_update(None, "busy_timeout", 5000)?;
            migrations::run_migrations(conn)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path, "database opened");
        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection. Query modules call through
    /// `connection().call(...)`.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Close the database, flushing pending writes.
    pub async fn close(self) -> Result<(), RekindleError> {
        self.conn.close().await.map_err(map_tr_err)
    }
}

/// Fold a tokio-rusqlite error into the workspace error type.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> RekindleError {
    match e {
        tokio_rusqlite::Error::Error(e) => RekindleError::Storage {
            source: Box::new(e),
        },
        other => RekindleError::Storage {
            source: Box::new(std::io::Error::other(other.to_string())),
        },
    }
}
