//! Captured-dispatch records.
//!
//! Two shapes travel through the pipeline. The in-page hook builds a
//! [`RecordPayload`] at dispatch time with a page-local id. The hub then
//! stamps each payload into an [`EventRecord`], assigning the authoritative
//! id and a receipt timestamp. Page-local ids restart whenever a page
//! reloads; hub ids are monotonic and gapless for the life of the hub.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Current wall-clock time in milliseconds since the Unix epoch.
///
/// Both the hook (dispatch time) and the hub (receipt time) stamp with this.
#[must_use]
pub fn now_ms() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

// ─────────────────────────────────────────────────────────────────────────────
// RecordPayload
// ─────────────────────────────────────────────────────────────────────────────

/// A captured dispatch, as built by the in-page hook.
///
/// `id` is page-local: it counts up from 1 inside one page context and is
/// superseded by the hub's id once the record is stamped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPayload {
    /// Page-local sequence number, starting at 1.
    pub id: u64,
    /// Event name as dispatched.
    pub name: String,
    /// Dispatch wall-clock time in milliseconds.
    pub ts: u64,
    /// Human-readable rendering of the detail payload.
    pub detail: String,
    /// Human-readable descriptor of the dispatch target.
    pub target: String,
    /// Whether the dispatch carried a developer payload.
    pub is_custom_event: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// EventRecord
// ─────────────────────────────────────────────────────────────────────────────

/// A buffered record, as stamped by the hub.
///
/// Identical to the payload it came from except that `id` is the hub's
/// monotonic sequence number and `timestamp` is the hub's receipt time.
/// Display and export use `ts`, the original dispatch time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Hub-assigned sequence number, monotonic and gapless from 1.
    pub id: u64,
    /// Event name as dispatched.
    pub name: String,
    /// Dispatch wall-clock time in milliseconds.
    pub ts: u64,
    /// Human-readable rendering of the detail payload.
    pub detail: String,
    /// Human-readable descriptor of the dispatch target.
    pub target: String,
    /// Whether the dispatch carried a developer payload.
    pub is_custom_event: bool,
    /// Hub receipt time in milliseconds.
    pub timestamp: u64,
}

impl EventRecord {
    /// Stamp a payload with the hub's id and receipt time.
    ///
    /// The payload's page-local id is discarded.
    #[must_use]
    pub fn stamp(payload: RecordPayload, id: u64, timestamp: u64) -> Self {
        Self {
            id,
            name: payload.name,
            ts: payload.ts,
            detail: payload.detail,
            target: payload.target,
            is_custom_event: payload.is_custom_event,
            timestamp,
        }
    }
}
