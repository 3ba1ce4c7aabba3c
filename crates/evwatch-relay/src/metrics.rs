//! Metric name constants.
//!
//! The hub records through the `metrics` facade; whichever recorder the
//! embedding process installs sees these series. Constants live here to
//! avoid typos across call sites.

/// Events recorded into the hub (counter).
pub const EVENTS_RECORDED_TOTAL: &str = "evwatch_events_recorded_total";
/// Records evicted from the ring buffer (counter).
pub const EVENTS_EVICTED_TOTAL: &str = "evwatch_events_evicted_total";
/// Fan-out messages an observer could not take (counter).
pub const FANOUT_DROPS_TOTAL: &str = "evwatch_fanout_drops_total";
/// Observers removed after a delivery failure (counter).
pub const OBSERVERS_DROPPED_TOTAL: &str = "evwatch_observers_dropped_total";
/// Attach requests rejected for a bad connection name (counter).
pub const ATTACH_REJECTED_TOTAL: &str = "evwatch_attach_rejected_total";
/// Currently attached observers (gauge).
pub const OBSERVERS_ACTIVE: &str = "evwatch_observers_active";
/// Envelopes the bridge ignored as foreign or malformed (counter).
pub const BRIDGE_IGNORED_TOTAL: &str = "evwatch_bridge_ignored_total";
