// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixture builders with consistent, predictable values.
//!
//! All timestamps are pinned to a fixed instant so tests never depend on
//! the wall clock.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rekindle_core::types::{
    Agent, Client, SubscriptionStatus, SubscriptionTier, Template,
};

/// The fixed instant every fixture is created at.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

/// An active professional-tier agent with a provisioned sending number
/// derived from the id. Email is `{id}@example.com`.
pub fn agent(id: &str) -> Agent {
    Agent {
        id: id.to_string(),
        email: format!("{id}@example.com"),
        first_name: "Dana".to_string(),
        last_name: "Reyes".to_string(),
        phone_number: "+15550000001".to_string(),
        company_name: Some("Reyes Realty".to_string()),
        subscription_tier: SubscriptionTier::Professional,
        subscription_status: SubscriptionStatus::Active,
        sms_from_number: Some("+15551230000".to_string()),
        is_active: true,
        created_at: epoch(),
        updated_at: epoch(),
    }
}

/// Same as [`agent`] but with no provisioned sending number.
pub fn agent_without_number(id: &str) -> Agent {
    Agent {
        sms_from_number: None,
        ..agent(id)
    }
}

/// An active client with a default engagement score.
pub fn client(id: &str, agent_id: &str, phone: &str, closing_date: NaiveDate) -> Client {
    Client {
        id: id.to_string(),
        agent_id: agent_id.to_string(),
        first_name: "Sam".to_string(),
        last_name: "Okafor".to_string(),
        phone_number: phone.to_string(),
        email: None,
        property_address: Some("42 Juniper Ln".to_string()),
        city: Some("Austin".to_string()),
        state: Some("TX".to_string()),
        zip: None,
        property_type: None,
        closing_date,
        notes: None,
        engagement_score: 50,
        is_active: true,
        created_at: epoch(),
        updated_at: epoch(),
    }
}

/// An active template at the given day offset.
pub fn template(id: &str, days_after_closing: i64, body: &str) -> Template {
    Template {
        id: id.to_string(),
        name: format!("fixture {id}"),
        trigger_days_after_closing: days_after_closing,
        body: body.to_string(),
        is_active: true,
        created_at: epoch(),
    }
}
