//! String formatting utilities for UI rendering.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Truncate a string to max length, adding ellipsis if needed.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len <= 3 {
        return s.chars().take(max_len).collect();
    }
    let kept: String = s.chars().take(max_len - 3).collect();
    format!("{}...", kept)
}

/// First 8 characters of a UUID.
pub fn short_id(id: &Uuid) -> String {
    id.to_string()[..8].to_string()
}

pub fn format_datetime(dt: &DateTime<Utc>, pretty: bool) -> String {
    if pretty {
        dt.format("%Y-%m-%d %H:%M UTC").to_string()
    } else {
        dt.to_rfc3339()
    }
}

/// Collapse line breaks so the text fits on one line.
pub fn single_line(s: &str) -> String {
    s.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

/// One-line preview of note content.
pub fn preview(content: Option<&str>, max_len: usize) -> String {
    truncate(&single_line(content.unwrap_or_default().trim()), max_len)
}
