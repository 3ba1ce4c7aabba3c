//! Per-page bridge between the page bus and the hub.

use metrics::counter;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument};

use evwatch_core::{PageEnvelope, WatcherMessage};

use crate::metrics::BRIDGE_IGNORED_TOTAL;
use crate::service::HubCommand;

/// Relays one page's captured events to the hub.
///
/// The page bus is shared with whatever else the page posts, so everything
/// is filtered: only envelopes from this bridge's own page whose body is a
/// captured-event message are forwarded. Everything else is ignored, never
/// an error. Per-page arrival order is preserved.
pub struct PageBridge {
    page_id: String,
    bus: mpsc::Receiver<PageEnvelope>,
    hub: mpsc::Sender<HubCommand>,
    shutdown: CancellationToken,
}

impl PageBridge {
    /// Bridge for `page_id`, draining `bus` into `hub` until `shutdown`
    /// fires.
    #[must_use]
    pub fn new(
        page_id: impl Into<String>,
        bus: mpsc::Receiver<PageEnvelope>,
        hub: mpsc::Sender<HubCommand>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            page_id: page_id.into(),
            bus,
            hub,
            shutdown,
        }
    }

    /// Run until the page bus closes or shutdown is requested.
    #[instrument(name = "page_bridge", skip_all, fields(page_id = %self.page_id))]
    pub async fn run(mut self) {
        debug!("page bridge started");
        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    debug!("page bridge stopping: shutdown requested");
                    break;
                }
                envelope = self.bus.recv() => {
                    let Some(envelope) = envelope else {
                        debug!("page bridge stopping: page bus closed");
                        break;
                    };
                    self.relay(envelope).await;
                }
            }
        }
    }

    async fn relay(&self, envelope: PageEnvelope) {
        if envelope.source != self.page_id {
            counter!(BRIDGE_IGNORED_TOTAL).increment(1);
            debug!(source = %envelope.source, "ignoring envelope from another source");
            return;
        }
        let Ok(message) = serde_json::from_value::<WatcherMessage>(envelope.body) else {
            counter!(BRIDGE_IGNORED_TOTAL).increment(1);
            debug!("ignoring non-watcher message");
            return;
        };
        let kind = message.message_type();
        let WatcherMessage::Event { data } = message else {
            counter!(BRIDGE_IGNORED_TOTAL).increment(1);
            debug!(kind, "ignoring unexpected watcher message");
            return;
        };
        if let Err(error) = self.hub.send(HubCommand::Record(data)).await {
            error!(%error, "hub unreachable, record lost");
        }
    }
}
