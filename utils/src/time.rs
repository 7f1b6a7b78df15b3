//! Time formatting helpers.

use evote_types::Timestamp;

/// Format a duration in seconds to a human-readable string.
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

/// "5m 3s ago" style label for a vote record.
pub fn format_elapsed(then: Timestamp, now: Timestamp) -> String {
    match then.elapsed_since(now) {
        0 => "just now".to_string(),
        secs => format!("{} ago", format_duration(secs)),
    }
}
