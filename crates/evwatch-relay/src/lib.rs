//! # evwatch-relay
//!
//! The middle of the evwatch pipeline: everything between the page bus and
//! an observer's receiver.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `bridge` | Per-page filter: page bus envelopes → hub commands |
//! | `hub` | Ring buffer, id stamping, observer fan-out |
//! | `connection` | One attached observer and its send half |
//! | `service` | Command-loop task that owns the hub lifecycle |
//! | `metrics` | Metric name constants |
//!
//! ## Data Flow
//!
//! `bridge` filters the page bus → `service` drains hub commands →
//! `hub` stamps, buffers, and fans out to each `connection`.

#![deny(unsafe_code)]

pub mod bridge;
pub mod connection;
pub mod hub;
pub mod metrics;
pub mod service;

pub use bridge::PageBridge;
pub use connection::ObserverConnection;
pub use hub::WatcherHub;
pub use service::{HubCommand, HubService};
