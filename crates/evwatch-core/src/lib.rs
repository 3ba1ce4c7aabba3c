//! # evwatch-core
//!
//! Shared vocabulary for the evwatch pipeline.
//!
//! Every stage of the pipeline — the in-page hook, the bridge, the hub, and
//! the panel — exchanges the types defined here:
//!
//! - [`record`] — captured-dispatch payloads and hub-stamped records.
//! - [`message`] — the tagged wire messages and the page bus envelope.
//! - [`policy`] — the page-global capture policy handle.
//! - [`constants`] — buffer sizes, display limits, and the observer port name.
//!
//! ## Crate Position
//!
//! `evwatch-core` sits at the bottom of the dependency graph. It depends on
//! nothing but serde, serde_json, and chrono, and every other evwatch crate
//! depends on it.

#![deny(unsafe_code)]

pub mod constants;
pub mod message;
pub mod policy;
pub mod record;

pub use message::{PageEnvelope, WatcherMessage};
pub use policy::CapturePolicy;
pub use record::{EventRecord, RecordPayload};
