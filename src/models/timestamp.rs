//! Timestamp helpers.
//!
//! All task timestamps are UTC with microsecond precision. Truncating at
//! creation means a value written to disk reads back bit-for-bit equal.
//!
//! The module doubles as a serde adapter:
//!
//! ```rust
//! use chrono::{DateTime, Utc};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Stamp {
//!     #[serde(with = "taskboard::models::timestamp")]
//!     at: DateTime<Utc>,
//! }
//! ```

use chrono::{DateTime, NaiveDateTime, SecondsFormat, SubsecRound, TimeDelta, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Returns the current time truncated to microseconds.
#[must_use]
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Returns a timestamp strictly later than `previous`.
///
/// Uses the wall clock when it has moved past `previous`, otherwise
/// `previous + 1µs`. Keeps `updated_at` strictly increasing across
/// mutations even when the clock is coarse or steps backwards.
#[must_use]
pub fn next_after(previous: DateTime<Utc>) -> DateTime<Utc> {
    let current = now();
    if current > previous {
        current
    } else {
        previous + TimeDelta::microseconds(1)
    }
}

/// Formats a timestamp as RFC 3339 with microseconds and a `Z` suffix.
#[must_use]
pub fn format(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses a timestamp.
///
/// Accepts RFC 3339 with any offset, and naive ISO-8601 date-times without
/// an offset (`2024-05-01T09:30:00.123456`), which are taken as UTC.
#[must_use]
pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc).trunc_subsecs(6));
    }
    raw.parse::<NaiveDateTime>()
        .ok()
        .map(|naive| naive.and_utc().trunc_subsecs(6))
}

/// Serializes a timestamp with [`format`].
pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(ts))
}

/// Deserializes a timestamp with [`parse`].
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}
