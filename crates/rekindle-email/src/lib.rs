// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transactional email integration for Rekindle.
//!
//! [`ResendMailer`] implements the notification capability over Resend's
//! HTTP API.

pub mod client;

pub use client::ResendMailer;
