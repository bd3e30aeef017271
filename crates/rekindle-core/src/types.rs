// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Rekindle workspace.
//!
//! All enumerations here are closed: unknown statuses, tiers, and property
//! types are unrepresentable once a value has been parsed at the storage or
//! API boundary.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Lifecycle state of a scheduled or delivered message.
///
/// Transitions are enforced by guarded conditional updates in the storage
/// layer; see `rekindle-storage::queries::messages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Scheduled,
    Sending,
    Sent,
    Delivered,
    Failed,
    Replied,
    Cancelled,
}

impl MessageStatus {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, MessageStatus::Failed | MessageStatus::Cancelled)
    }
}

/// Property categories captured at client intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    SingleFamily,
    Condo,
    Townhouse,
    MultiFamily,
    Land,
    Other,
}

impl PropertyType {
    /// Human label used in message bodies. Six categories collapse onto
    /// five display labels.
    pub fn display_label(&self) -> &'static str {
        match self {
            PropertyType::SingleFamily => "house",
            PropertyType::Condo => "condo",
            PropertyType::Townhouse => "townhouse",
            PropertyType::MultiFamily | PropertyType::Land => "property",
            PropertyType::Other => "place",
        }
    }
}

/// Subscription plans, mapped to capacity limits via [`SubscriptionTier::limits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Starter,
    Professional,
    Elite,
    Team,
    Brokerage,
}

/// Capacity limits attached to a subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierLimits {
    /// Maximum active clients per agent. `None` means unlimited.
    pub max_active_clients: Option<u32>,
}

impl SubscriptionTier {
    /// Capacity limits for this tier. Team plans pool their allowance
    /// across member agents; brokerage plans are unlimited.
    pub fn limits(&self) -> TierLimits {
        let max_active_clients = match self {
            SubscriptionTier::Starter => Some(20),
            SubscriptionTier::Professional => Some(100),
            SubscriptionTier::Elite => Some(500),
            SubscriptionTier::Team => Some(1000),
            SubscriptionTier::Brokerage => None,
        };
        TierLimits { max_active_clients }
    }
}

/// Billing state of an agent account, maintained by the billing webhook
/// handler outside the engine. The dispatcher treats it as a read-only gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    PastDue,
    Cancelled,
}

/// Pipeline state of a referral lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReferralStatus {
    New,
    Contacted,
    Qualified,
    Converted,
    Lost,
}

/// A paying customer (real-estate professional). Agents are the tenant
/// boundary: every client and message is owned by exactly one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub company_name: Option<String>,
    pub subscription_tier: SubscriptionTier,
    pub subscription_status: SubscriptionStatus,
    /// Provisioned sending number. Absence is a permanent delivery failure
    /// for this agent's messages, not a retryable one.
    pub sms_from_number: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Agent {
    /// Full display name, also used for the message signature rule.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A past-transaction contact of an agent; the recipient of scheduled
/// follow-up messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub agent_id: String,
    pub first_name: String,
    pub last_name: String,
    /// E.164, unique per agent among active clients.
    pub phone_number: String,
    pub email: Option<String>,
    pub property_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub property_type: Option<PropertyType>,
    pub closing_date: NaiveDate,
    pub notes: Option<String>,
    /// 0-100 responsiveness proxy, default 50.
    pub engagement_score: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client attributes supplied at intake, before an id or defaults exist.
#[derive(Debug, Clone, Deserialize)]
pub struct NewClient {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub property_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub property_type: Option<PropertyType>,
    pub closing_date: NaiveDate,
    pub notes: Option<String>,
}

impl Default for NewClient {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            phone_number: String::new(),
            email: None,
            property_address: None,
            city: None,
            state: None,
            zip: None,
            property_type: None,
            closing_date: NaiveDate::MIN,
            notes: None,
        }
    }
}

impl Client {
    /// Materialize a new client row from intake attributes.
    pub fn from_new(new: NewClient, agent_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            agent_id: agent_id.to_string(),
            first_name: new.first_name,
            last_name: new.last_name,
            phone_number: new.phone_number,
            email: new.email,
            property_address: new.property_address,
            city: new.city,
            state: new.state,
            zip: new.zip,
            property_type: new.property_type,
            closing_date: new.closing_date,
            notes: new.notes,
            engagement_score: 50,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// One scheduled or delivered communication to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    pub client_id: String,
    /// Denormalized for tenant-scoped queries.
    pub agent_id: String,
    pub body: String,
    pub scheduled_for: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub status: MessageStatus,
    /// Provider message identifier, unique when present.
    pub provider_sid: Option<String>,
    pub reply_text: Option<String>,
    pub reply_at: Option<DateTime<Utc>>,
    pub is_read: bool,
    pub failed_reason: Option<String>,
    pub retry_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MessageRecord {
    /// A freshly scheduled message as the scheduler creates it.
    pub fn scheduled(
        client: &Client,
        body: String,
        scheduled_for: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            client_id: client.id.clone(),
            agent_id: client.agent_id.clone(),
            body,
            scheduled_for,
            sent_at: None,
            delivered_at: None,
            status: MessageStatus::Scheduled,
            provider_sid: None,
            reply_text: None,
            reply_at: None,
            is_read: false,
            failed_reason: None,
            retry_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A global, offset-based message blueprint. Provisioned once via the seed
/// migration; read-only relative to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub trigger_days_after_closing: i64,
    pub body: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Referral attributes supplied when an agent logs a lead.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReferral {
    pub referred_by_client_id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

/// A lead attributed to a past client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Referral {
    pub id: String,
    pub agent_id: String,
    pub referred_by_client_id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub status: ReferralStatus,
    pub notes: Option<String>,
    pub contacted_at: Option<DateTime<Utc>>,
    pub converted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Referral {
    /// Materialize a new referral row from intake attributes.
    pub fn from_new(new: NewReferral, agent_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            agent_id: agent_id.to_string(),
            referred_by_client_id: new.referred_by_client_id,
            first_name: new.first_name,
            last_name: new.last_name,
            phone: new.phone,
            email: new.email,
            status: ReferralStatus::New,
            notes: new.notes,
            contacted_at: None,
            converted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
