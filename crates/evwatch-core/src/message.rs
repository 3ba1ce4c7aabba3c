//! Wire messages and the page bus envelope.
//!
//! [`WatcherMessage`] is the tagged protocol spoken on both legs of the
//! relay: page to hub (via the bridge) and hub to observers. The tag names
//! are the wire contract and must not change. [`PageEnvelope`] models the
//! page's shared message bus, where evwatch traffic is interleaved with
//! arbitrary messages posted by other scripts.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::{EventRecord, RecordPayload};

/// Tagged messages exchanged across the relay pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WatcherMessage {
    /// Page to hub: one freshly captured dispatch.
    #[serde(rename = "EVENT_WATCHER_EVENT")]
    Event {
        /// The captured payload, still carrying its page-local id.
        data: RecordPayload,
    },
    /// Hub to a newly attached observer: trailing history, oldest first.
    #[serde(rename = "EVENT_WATCHER_INIT")]
    Init {
        /// At most [`INIT_SNAPSHOT_LIMIT`] records, chronological order.
        ///
        /// [`INIT_SNAPSHOT_LIMIT`]: crate::constants::INIT_SNAPSHOT_LIMIT
        data: Vec<EventRecord>,
    },
    /// Hub to every attached observer: one newly stamped record.
    #[serde(rename = "EVENT_WATCHER_NEW_EVENT")]
    NewEvent {
        /// The stamped record.
        data: EventRecord,
    },
}

impl WatcherMessage {
    /// The wire tag, for logs and bridge-side filtering.
    #[must_use]
    pub fn message_type(&self) -> &'static str {
        match self {
            Self::Event { .. } => "EVENT_WATCHER_EVENT",
            Self::Init { .. } => "EVENT_WATCHER_INIT",
            Self::NewEvent { .. } => "EVENT_WATCHER_NEW_EVENT",
        }
    }
}

/// An envelope on a page's shared message bus.
///
/// Every script in a page posts to the same bus, so the body stays loosely
/// typed until the bridge inspects it. The bridge only forwards envelopes
/// whose `source` matches its own page and whose body parses as an evwatch
/// message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope {
    /// Identity of the posting page context.
    pub source: String,
    /// Unvalidated message body.
    pub body: Value,
}

impl PageEnvelope {
    /// Wrap an arbitrary body for the page bus.
    #[must_use]
    pub fn new(source: impl Into<String>, body: Value) -> Self {
        Self {
            source: source.into(),
            body,
        }
    }
}
