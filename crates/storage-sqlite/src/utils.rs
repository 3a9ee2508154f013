//! Utility functions for SQLite storage operations.
//!
//! Timestamps are stored as RFC 3339 text with as many fractional digits as
//! needed, so a value read back compares equal to the one written.

use chrono::{DateTime, SecondsFormat, Utc};

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}
