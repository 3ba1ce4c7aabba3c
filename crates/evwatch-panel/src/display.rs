//! Payload and time rendering for the event list.

use chrono::DateTime;

/// Pretty-print a detail payload when it parses as JSON.
///
/// Sentinel details and other non-JSON strings come back unchanged.
#[must_use]
pub fn format_payload(detail: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(detail) {
        Ok(value) => {
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| detail.to_string())
        }
        Err(_) => detail.to_string(),
    }
}

/// Wall-clock time of day for a millisecond timestamp, UTC.
#[must_use]
pub fn format_time(ts_ms: u64) -> String {
    i64::try_from(ts_ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map_or_else(|| "--:--:--".to_string(), |at| at.format("%H:%M:%S").to_string())
}
