//! Pipeline-wide limits and identifiers.
//!
//! These values are part of the behavioral contract between the hub and its
//! observers. Changing them changes what observers see on attach and how far
//! back history reaches, so they live here rather than in any one stage.

/// Maximum records the hub retains. Oldest records are evicted first.
pub const MAX_EVENTS: usize = 2000;

/// How many trailing records a newly attached observer receives.
pub const INIT_SNAPSHOT_LIMIT: usize = 100;

/// How many matching records the panel renders by default.
pub const DEFAULT_DISPLAY_LIMIT: usize = 100;

/// How much the panel's display window grows per "show more" request.
pub const DISPLAY_INCREMENT: usize = 100;

/// Maximum nesting depth the hook descends when rendering a detail payload.
pub const MAX_SERIALIZE_DEPTH: usize = 3;

/// Connection name that identifies observer traffic at the hub.
///
/// Attach requests carrying any other name are rejected without side
/// effects.
pub const OBSERVER_PORT_NAME: &str = "event-watcher-devtools";
