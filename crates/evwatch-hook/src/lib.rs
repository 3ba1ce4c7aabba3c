//! # evwatch-hook
//!
//! The in-page half of the evwatch pipeline: a wrapper around the host's
//! dispatch seam that captures interesting dispatches as [`RecordPayload`]s
//! and posts them to the page bus, without ever changing what the host sees.
//!
//! - [`dispatch`] — the [`Dispatch`] seam and the [`TapDispatcher`] wrapper.
//! - [`event`] — the host-side event model ([`HostEvent`], [`DetailValue`]).
//! - [`serialize`] — depth-bounded, cycle-safe detail rendering.
//! - [`target`] — human-readable dispatch target descriptors.
//!
//! ## Crate Position
//!
//! Depends only on `evwatch-core`. The relay and panel crates consume its
//! captures over the page bus rather than by depending on it.
//!
//! [`RecordPayload`]: evwatch_core::RecordPayload

#![deny(unsafe_code)]

pub mod dispatch;
pub mod event;
pub mod serialize;
pub mod target;

pub use dispatch::{Dispatch, TapDispatcher};
pub use event::{DetailValue, HostEvent};
pub use serialize::safe_stringify;
pub use target::{EventTarget, describe_target};
