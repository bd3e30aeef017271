// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Rekindle follow-up engine.
//!
//! Provides the error type, domain types, and the capability traits
//! implemented by delivery and notification providers. Every other crate
//! in the workspace builds on these definitions.

pub mod error;
pub mod traits;
pub mod types;

pub use error::RekindleError;
pub use traits::{DeliveryReceipt, Notifier, SmsSender};
pub use types::{
    Agent, Client, MessageRecord, MessageStatus, NewClient, NewReferral, PropertyType, Referral,
    ReferralStatus, SubscriptionStatus, SubscriptionTier, Template, TierLimits,
};
