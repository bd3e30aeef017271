// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Rekindle follow-up engine.

use thiserror::Error;

/// The primary error type used across all Rekindle crates.
#[derive(Debug, Error)]
pub enum RekindleError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Outbound delivery errors (provider API failure, rejected number, rate limiting).
    #[error("delivery error: {message}")]
    Delivery {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Notification errors (email provider failure). Callers on the inbound
    /// path treat these as best-effort and never propagate them.
    #[error("notification error: {message}")]
    Notify { message: String },

    /// Input rejected at a collaborator boundary (bad phone format, missing fields).
    #[error("validation error: {0}")]
    Validation(String),

    /// Active-client capacity for the agent's subscription tier is exhausted.
    #[error("client limit reached for {tier} tier: {current}/{limit}")]
    TierLimit {
        tier: String,
        current: u32,
        limit: u32,
    },

    /// A delivery attempt exceeded its bounded timeout.
    #[error("delivery attempt timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
