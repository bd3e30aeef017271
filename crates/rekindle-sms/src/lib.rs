// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Twilio SMS integration for Rekindle.
//!
//! [`TwilioSender`] implements the outbound delivery capability;
//! [`signature`] validates inbound webhook authenticity.

pub mod client;
pub mod signature;

pub use client::TwilioSender;
pub use signature::{compute_signature, validate_signature};
