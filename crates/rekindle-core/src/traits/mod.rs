// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits at the delivery and notification seams.
//!
//! Concrete providers (Twilio, Resend) and test doubles implement these.
//! Components receive them by constructor injection; a missing capability
//! is an explicit `Option`, never a lazily created global.

pub mod notify;
pub mod sms;

pub use notify::Notifier;
pub use sms::{DeliveryReceipt, SmsSender};
