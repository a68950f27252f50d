//! Display formatting helpers for show and episode values.

use chrono::{DateTime, NaiveDate, Utc};
use humansize::{DECIMAL, format_size};

/// Formats a byte count like `1.5 MB`; negative sizes are shown as `0 B`
pub fn human_size(bytes: i64) -> String {
    format_size(u64::try_from(bytes).unwrap_or(0), DECIMAL)
}

/// Formats `timestamp` relative to `now`, e.g. `5m ago` or `in 2d`.
pub fn relative_time(timestamp: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let secs = (*now - *timestamp).num_seconds();
    let future = secs < 0;
    let secs = secs.abs();
    if secs < 60 {
        return "just now".into();
    }

    let amount = if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86400 {
        format!("{}h", secs / 3600)
    } else {
        format!("{}d", secs / 86400)
    };

    if future {
        format!("in {amount}")
    } else {
        format!("{amount} ago")
    }
}

/// Formats an air date, or `TBA` when unknown
pub fn format_airdate(airdate: Option<NaiveDate>) -> String {
    match airdate {
        Some(date) => date.format("%b %-d, %Y").to_string(),
        None => "TBA".into(),
    }
}
