//! Time utilities for AgenticSuccession.
//!
//! All timestamps are Unix epoch seconds (u64), matching the granularity of
//! the inactivity clock.

/// Seconds in one day.
pub const SECS_PER_DAY: u64 = 86_400;

/// Return the current time as seconds since Unix epoch.
///
/// A clock set before the epoch reads as 0.
pub fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Convert a whole number of days to seconds.
pub const fn days(n: u64) -> u64 {
    n * SECS_PER_DAY
}

/// Convert seconds to an RFC 3339 string.
pub fn secs_to_rfc3339(secs: u64) -> String {
    let dt = chrono::DateTime::from_timestamp(secs as i64, 0).unwrap_or(chrono::DateTime::UNIX_EPOCH);
    dt.to_rfc3339()
}

/// Render a duration in seconds as `"{d}d {h}h {m}m"`.
pub fn format_duration(secs: u64) -> String {
    let d = secs / SECS_PER_DAY;
    let h = (secs % SECS_PER_DAY) / 3600;
    let m = (secs % 3600) / 60;
    format!("{d}d {h}h {m}m")
}
