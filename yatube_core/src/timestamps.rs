//! Timestamps are stored as fixed-width RFC 3339 strings in UTC with
//! microsecond precision, so that comparing the strings compares the instants.

use chrono::{DateTime, Duration, SecondsFormat, Utc};

pub fn format(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn now() -> String {
    format(Utc::now())
}

/// Timestamp `age` before now, used as a lower bound for expiry checks.
pub fn ago(age: Duration) -> String {
    format(Utc::now() - age)
}

pub fn parse(stored: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(stored)
        .ok()
        .map(|at| at.with_timezone(&Utc))
}

/// Human-readable form used by the templates, e.g. `20 Oct 2025 14:03`.
pub fn display(stored: &str) -> String {
    match parse(stored) {
        Some(at) => at.format("%d %b %Y %H:%M").to_string(),
        None => stored.to_string(),
    }
}
