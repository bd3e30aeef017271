// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound webhook server for Rekindle.
//!
//! Receives provider callbacks (inbound SMS, delivery receipts), validates
//! authenticity when configured, and hands events to the correlator. Always
//! acknowledges quickly; the provider has no useful retry semantics for us.

pub mod handlers;
pub mod server;

pub use server::{GatewayState, ServerConfig, SignatureConfig, router, start_server};
