// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Rekindle follow-up engine.
//!
//! Layered TOML + environment configuration built on Figment, with strict
//! unknown-key rejection so typos surface at startup instead of silently
//! falling back to defaults.

pub mod loader;
pub mod model;

pub use loader::{load, load_config, load_config_from_path, load_config_from_str};
pub use model::RekindleConfig;
