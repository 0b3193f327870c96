//! Display formatting helpers for the record model.
//!
//! Every consuming surface formats sizes, timestamps, and fingerprints the
//! same way by going through these functions.

use chrono::{LocalResult, TimeZone, Utc};

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human-readable byte size: `0 Bytes`, `1.5 KB`, `2 MB`.
///
/// Base-1024 units, rounded to two decimals with trailing zeros trimmed.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let exponent = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exponent = exponent.min(SIZE_UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    let rounded = (value * 100.0).round() / 100.0;

    let mut number = format!("{rounded:.2}");
    while number.ends_with('0') {
        number.pop();
    }
    if number.ends_with('.') {
        number.pop();
    }
    format!("{} {}", number, SIZE_UNITS[exponent])
}

/// Render an epoch-ms timestamp as `Mar 5, 2026 14:30` (UTC).
pub fn format_timestamp(timestamp_ms: i64) -> String {
    match Utc.timestamp_millis_opt(timestamp_ms) {
        LocalResult::Single(dt) => dt.format("%b %-d, %Y %H:%M").to_string(),
        _ => "invalid date".to_string(),
    }
}

/// Truncated display form of a fingerprint or signature:
/// `sha256:abc...f00d`. Short inputs are returned unchanged.
pub fn truncate_hash(hash: &str, start_chars: usize, end_chars: usize) -> String {
    let chars: Vec<char> = hash.chars().collect();
    if chars.len() <= start_chars + end_chars {
        return hash.to_string();
    }
    let head: String = chars[..start_chars].iter().collect();
    let tail: String = chars[chars.len() - end_chars..].iter().collect();
    format!("{head}...{tail}")
}
