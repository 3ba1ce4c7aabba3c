//! # evwatch-panel
//!
//! The observer end of the evwatch pipeline: a reactive store over the
//! relay's message stream plus the pure derivations the panel UI renders
//! from.
//!
//! - [`store`] — local event log, pause, mirror bookkeeping, control ops.
//! - [`filter`] — pure (log, config) → display list derivation.
//! - [`export`] — filtered-set export artifact and the download seam.
//! - [`display`] — payload and time rendering helpers.
//!
//! ## Crate Position
//!
//! Depends only on `evwatch-core`. The store consumes [`WatcherMessage`]s
//! from whatever channel the host wires to an observer connection.
//!
//! [`WatcherMessage`]: evwatch_core::WatcherMessage

#![deny(unsafe_code)]

pub mod display;
pub mod export;
pub mod filter;
pub mod store;

pub use display::{format_payload, format_time};
pub use export::{Downloader, ExportArtifact, ExportDocument, ExportError};
pub use filter::{FilterConfig, display_window, filter_records};
pub use store::{ConsoleMirror, PanelStore};
