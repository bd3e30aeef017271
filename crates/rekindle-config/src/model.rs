// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Rekindle follow-up engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Rekindle configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RekindleConfig {
    /// Sweep cadence, retry policy, and logging.
    #[serde(default)]
    pub engine: EngineConfig,

    /// SQLite storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Twilio SMS delivery settings.
    #[serde(default)]
    pub twilio: TwilioConfig,

    /// Transactional email settings.
    #[serde(default)]
    pub email: EmailConfig,

    /// Inbound webhook server settings.
    #[serde(default)]
    pub webhook: WebhookConfig,
}

/// Engine cadence and policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Seconds between dispatcher sweeps.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Seconds between engagement scoring passes.
    #[serde(default = "default_scoring_interval_secs")]
    pub scoring_interval_secs: u64,

    /// Maximum due messages processed per sweep.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Delivery attempts per message before it fails terminally.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Bound on a single outbound delivery attempt, in seconds.
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            sweep_interval_secs: default_sweep_interval_secs(),
            scoring_interval_secs: default_scoring_interval_secs(),
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            attempt_timeout_secs: default_attempt_timeout_secs(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_sweep_interval_secs() -> u64 {
    900
}

fn default_scoring_interval_secs() -> u64 {
    86_400
}

fn default_batch_size() -> u32 {
    100
}

fn default_max_retries() -> u32 {
    3
}

fn default_attempt_timeout_secs() -> u64 {
    30
}

/// SQLite storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "rekindle.db".to_string()
}

/// Twilio API configuration. Both fields unset disables outbound delivery;
/// due messages then fail terminally with a recorded reason.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TwilioConfig {
    /// Twilio account SID.
    #[serde(default)]
    pub account_sid: Option<String>,

    /// Twilio auth token. Also used for webhook signature validation.
    #[serde(default)]
    pub auth_token: Option<String>,
}

impl TwilioConfig {
    /// Credentials pair when both halves are present.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.account_sid.as_deref(), self.auth_token.as_deref()) {
            (Some(sid), Some(token)) => Some((sid, token)),
            _ => None,
        }
    }
}

/// Transactional email configuration. `api_key` unset disables agent
/// notifications.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmailConfig {
    /// Resend API key. `None` disables notification email.
    #[serde(default)]
    pub api_key: Option<String>,

    /// From header for outbound notification email.
    #[serde(default = "default_email_from")]
    pub from_address: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            from_address: default_email_from(),
        }
    }
}

fn default_email_from() -> String {
    "Rekindle <notifications@rekindle.app>".to_string()
}

/// Inbound webhook server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookConfig {
    /// Host address to bind.
    #[serde(default = "default_webhook_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_webhook_port")]
    pub port: u16,

    /// Externally visible URL of the incoming-SMS endpoint, required for
    /// signature validation.
    #[serde(default)]
    pub public_url: Option<String>,

    /// Verify the X-Twilio-Signature header on inbound webhooks.
    #[serde(default)]
    pub validate_signatures: bool,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            host: default_webhook_host(),
            port: default_webhook_port(),
            public_url: None,
            validate_signatures: false,
        }
    }
}

fn default_webhook_host() -> String {
    "127.0.0.1".to_string()
}

fn default_webhook_port() -> u16 {
    8080
}
