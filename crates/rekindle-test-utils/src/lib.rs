// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Rekindle integration tests.
//!
//! Mock delivery/notification capabilities, a temp-file database harness,
//! and fixture builders used across the workspace's test suites.

pub mod fixtures;
pub mod mock_notifier;
pub mod mock_sms;

use rekindle_core::types::Template;
use rekindle_storage::Database;
use rekindle_storage::queries::templates;

pub use mock_notifier::{MockNotifier, SentNotification};
pub use mock_sms::{MockSms, SentSms};

/// Open a fresh migrated database in a temp directory.
///
/// Keep the returned `TempDir` alive for as long as the database is in use.
pub async fn fresh_db() -> (Database, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let db_path = dir.path().join("test.db");
    let db = Database::open(db_path.to_str().expect("utf-8 temp path"))
        .await
        .expect("open test database");
    (db, dir)
}

/// Replace the seeded template cadence with exactly the given templates.
pub async fn use_only_templates(db: &Database, custom: &[Template]) {
    templates::deactivate_all(db).await.expect("clear templates");
    for template in custom {
        templates::insert_template(db, template)
            .await
            .expect("insert fixture template");
    }
}
