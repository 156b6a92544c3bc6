//! Timestamp formatting helpers for the wfplog CLI output.

use chrono::{DateTime, Local, Utc};

/// Format a UTC capture timestamp for the console tail.
///
/// Shows local time with millisecond precision, e.g.
/// `2026-08-27 10:23:45.123`.
pub fn format_entry_timestamp(ts: &DateTime<Utc>) -> String {
    let local: DateTime<Local> = ts.with_timezone(&Local);
    local.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}
