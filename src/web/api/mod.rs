pub mod ephemeris;
pub mod error;
pub mod passes;
pub mod polar;
pub mod satellites;
pub mod station;

use chrono::{DateTime, NaiveDateTime, Utc};

/// Accepts RFC 3339, or a naive `YYYY-MM-DD[T ]HH:MM[:SS[.f]]` taken as UTC.
pub fn parse_time(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid time: {}", s))
}
