// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per entity.

pub mod agents;
pub mod clients;
pub mod messages;
pub mod referrals;
pub mod templates;
