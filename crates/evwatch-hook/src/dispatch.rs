//! The dispatch seam and the capturing wrapper.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;

use evwatch_core::record::now_ms;
use evwatch_core::{CapturePolicy, PageEnvelope, RecordPayload, WatcherMessage};

use crate::event::{DetailValue, HostEvent};
use crate::serialize::{NOT_A_CUSTOM_EVENT, safe_stringify};
use crate::target::describe_target;

/// The host's dispatch seam.
///
/// Every dispatch in a page funnels through one such primitive.
/// Implementations deliver the event to its listeners and report whether
/// default handling may proceed.
pub trait Dispatch {
    /// Deliver `event`. Returns false when a listener cancelled it.
    fn dispatch(&mut self, event: &HostEvent) -> bool;
}

/// Capturing wrapper around a host dispatcher.
///
/// Installed once at the host's interception point. Custom events are always
/// captured; builtin events only while the capture policy says so. Captures
/// are posted to the page bus fire-and-forget: a full or closed bus drops
/// the record with a debug log. Delivery to the inner dispatcher is never
/// altered, delayed, or failed by capture.
pub struct TapDispatcher<D> {
    inner: D,
    policy: CapturePolicy,
    bus: mpsc::Sender<PageEnvelope>,
    page_id: String,
    next_id: u64,
}

impl<D: Dispatch> TapDispatcher<D> {
    /// Wrap `inner`, posting captures to `bus` under `page_id`.
    #[must_use]
    pub fn new(
        inner: D,
        policy: CapturePolicy,
        bus: mpsc::Sender<PageEnvelope>,
        page_id: impl Into<String>,
    ) -> Self {
        let page_id = page_id.into();
        debug!(page_id = %page_id, "dispatch tap installed");
        Self {
            inner,
            policy,
            bus,
            page_id,
            next_id: 0,
        }
    }

    /// The wrapped dispatcher.
    pub fn inner(&self) -> &D {
        &self.inner
    }

    /// How many dispatches this wrapper has captured.
    pub fn captured(&self) -> u64 {
        self.next_id
    }

    fn capture(&mut self, event: &HostEvent) {
        self.next_id += 1;
        let detail = if event.custom {
            safe_stringify(event.detail.as_ref().unwrap_or(&DetailValue::Null))
        } else {
            NOT_A_CUSTOM_EVENT.to_string()
        };
        let payload = RecordPayload {
            id: self.next_id,
            name: event.name.clone(),
            ts: now_ms(),
            detail,
            target: describe_target(event.target.as_ref()),
            is_custom_event: event.custom,
        };

        let body = match serde_json::to_value(WatcherMessage::Event { data: payload }) {
            Ok(body) => body,
            Err(error) => {
                debug!(%error, event = %event.name, "capture not serializable, dropped");
                return;
            }
        };
        match self.bus.try_send(PageEnvelope::new(self.page_id.clone(), body)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                debug!(event = %event.name, "page bus full, capture dropped");
            }
            Err(TrySendError::Closed(_)) => {
                debug!(event = %event.name, "page bus closed, capture dropped");
            }
        }
    }
}

impl<D: Dispatch> Dispatch for TapDispatcher<D> {
    fn dispatch(&mut self, event: &HostEvent) -> bool {
        if event.custom || self.policy.capture_all() {
            self.capture(event);
        }
        self.inner.dispatch(event)
    }
}
