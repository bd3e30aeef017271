// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage-side model types and column conversion helpers.
//!
//! The canonical entity types live in `rekindle-core::types` and are
//! re-exported here for convenience within the storage crate. Timestamps are
//! stored as ISO-8601 UTC text (`%Y-%m-%dT%H:%M:%fZ`), which sorts
//! lexicographically and therefore compares correctly in SQL.

use chrono::{DateTime, NaiveDate, Utc};

pub use rekindle_core::types::{
    Agent, Client, MessageRecord, MessageStatus, PropertyType, Referral, ReferralStatus,
    SubscriptionStatus, SubscriptionTier, Template,
};

/// A due message joined with the delivery addresses the dispatcher needs.
#[derive(Debug, Clone)]
pub struct DueMessage {
    pub message: MessageRecord,
    /// The recipient's phone number.
    pub client_phone: String,
    /// The owning agent's provisioned sending number, if any.
    pub agent_from_number: Option<String>,
}

pub(crate) fn ts_to_sql(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

pub(crate) fn ts_from_sql(s: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
}

pub(crate) fn opt_ts_from_sql(s: Option<String>) -> Result<Option<DateTime<Utc>>, rusqlite::Error> {
    s.as_deref().map(ts_from_sql).transpose()
}

pub(crate) fn date_to_sql(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

pub(crate) fn date_from_sql(s: &str) -> Result<NaiveDate, rusqlite::Error> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Parse a closed string enumeration out of a column value.
pub(crate) fn enum_from_sql<T: std::str::FromStr>(s: &str) -> Result<T, rusqlite::Error>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    s.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_round_trip() {
        let t = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        let s = ts_to_sql(t);
        assert_eq!(s, "2026-03-14T09:26:53.000Z");
        assert_eq!(ts_from_sql(&s).unwrap(), t);
    }

    #[test]
    fn sql_timestamps_sort_lexicographically() {
        let earlier = ts_to_sql(Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap());
        let later = ts_to_sql(Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap());
        assert!(earlier < later);
    }

    #[test]
    fn dates_round_trip() {
        let d = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        let s = date_to_sql(d);
        assert_eq!(s, "2025-12-31");
        assert_eq!(date_from_sql(&s).unwrap(), d);
    }

    #[test]
    fn enum_from_sql_rejects_unknown_values() {
        assert!(enum_from_sql::<MessageStatus>("sending").is_ok());
        assert!(enum_from_sql::<MessageStatus>("bogus").is_err());
    }
}
