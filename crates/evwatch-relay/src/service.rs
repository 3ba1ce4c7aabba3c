//! The hub command loop.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use evwatch_core::RecordPayload;

use crate::connection::ObserverConnection;
use crate::hub::WatcherHub;

/// Commands the hub service drains, in arrival order.
#[derive(Debug)]
pub enum HubCommand {
    /// Buffer a captured payload and fan it out.
    Record(RecordPayload),
    /// Attach an observer.
    Attach(ObserverConnection),
    /// Detach an observer by connection id.
    Detach(String),
}

/// Drains [`HubCommand`]s into a shared [`WatcherHub`].
///
/// One service runs per deployment. Multiple bridges may feed the command
/// channel concurrently; commands from one page keep their order, commands
/// across pages interleave arbitrarily. The loop ends when the channel
/// closes or the shutdown token fires.
pub struct HubService {
    hub: Arc<WatcherHub>,
    commands: mpsc::Receiver<HubCommand>,
    shutdown: CancellationToken,
}

impl HubService {
    /// Service draining `commands` into `hub` until `shutdown` fires.
    #[must_use]
    pub fn new(
        hub: Arc<WatcherHub>,
        commands: mpsc::Receiver<HubCommand>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            hub,
            commands,
            shutdown,
        }
    }

    /// Run until the command channel closes or shutdown is requested.
    #[instrument(name = "hub_service", skip_all)]
    pub async fn run(mut self) {
        debug!("hub service started");
        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    debug!("hub service stopping: shutdown requested");
                    break;
                }
                command = self.commands.recv() => {
                    let Some(command) = command else {
                        debug!("hub service stopping: command channel closed");
                        break;
                    };
                    self.handle(command);
                }
            }
        }
    }

    fn handle(&self, command: HubCommand) {
        match command {
            HubCommand::Record(payload) => {
                let _ = self.hub.record_event(payload);
            }
            HubCommand::Attach(conn) => self.hub.attach_observer(conn),
            HubCommand::Detach(conn_id) => self.hub.detach_observer(&conn_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use evwatch_core::WatcherMessage;
    use evwatch_core::constants::OBSERVER_PORT_NAME;

    use super::*;

    fn payload(name: &str) -> RecordPayload {
        RecordPayload {
            id: 1,
            name: name.to_string(),
            ts: 1,
            detail: "null".to_string(),
            target: "document".to_string(),
            is_custom_event: true,
        }
    }

    fn spawn_service(
        hub: &Arc<WatcherHub>,
        shutdown: &CancellationToken,
    ) -> (mpsc::Sender<HubCommand>, tokio::task::JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(32);
        let service = HubService::new(Arc::clone(hub), rx, shutdown.clone());
        let handle = tokio::spawn(service.run());
        (tx, handle)
    }

    #[tokio::test]
    async fn drains_commands_in_order() {
        let hub = Arc::new(WatcherHub::new());
        let shutdown = CancellationToken::new();
        let (tx, handle) = spawn_service(&hub, &shutdown);

        let (obs_tx, mut obs_rx) = mpsc::channel(8);
        let conn = ObserverConnection::new(OBSERVER_PORT_NAME, obs_tx);
        tx.send(HubCommand::Attach(conn)).await.unwrap();
        tx.send(HubCommand::Record(payload("one"))).await.unwrap();

        assert_matches!(obs_rx.recv().await, Some(WatcherMessage::Init { data }) if data.is_empty());
        assert_matches!(
            obs_rx.recv().await,
            Some(WatcherMessage::NewEvent { data }) if data.name == "one" && data.id == 1
        );

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn detach_stops_delivery() {
        let hub = Arc::new(WatcherHub::new());
        let shutdown = CancellationToken::new();
        let (tx, handle) = spawn_service(&hub, &shutdown);

        let (gone_tx, mut gone_rx) = mpsc::channel(8);
        let gone = ObserverConnection::new(OBSERVER_PORT_NAME, gone_tx);
        let gone_id = gone.id.clone();
        let (kept_tx, mut kept_rx) = mpsc::channel(8);
        let kept = ObserverConnection::new(OBSERVER_PORT_NAME, kept_tx);

        tx.send(HubCommand::Attach(gone)).await.unwrap();
        tx.send(HubCommand::Detach(gone_id)).await.unwrap();
        tx.send(HubCommand::Attach(kept)).await.unwrap();
        tx.send(HubCommand::Record(payload("missed"))).await.unwrap();

        // The kept observer seeing the record proves it was processed.
        assert_matches!(kept_rx.recv().await, Some(WatcherMessage::Init { .. }));
        assert_matches!(
            kept_rx.recv().await,
            Some(WatcherMessage::NewEvent { data }) if data.name == "missed"
        );

        assert_matches!(gone_rx.recv().await, Some(WatcherMessage::Init { .. }));
        assert!(gone_rx.try_recv().is_err());
        assert_eq!(hub.len(), 1);

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn closing_the_command_channel_stops_the_service() {
        let hub = Arc::new(WatcherHub::new());
        let shutdown = CancellationToken::new();
        let (tx, handle) = spawn_service(&hub, &shutdown);

        tx.send(HubCommand::Record(payload("last"))).await.unwrap();
        drop(tx);

        handle.await.unwrap();
        assert_eq!(hub.len(), 1);
    }

    #[tokio::test]
    async fn shutdown_stops_the_service_with_the_channel_still_open() {
        let hub = Arc::new(WatcherHub::new());
        let shutdown = CancellationToken::new();
        let (tx, handle) = spawn_service(&hub, &shutdown);

        shutdown.cancel();
        handle.await.unwrap();
        drop(tx);
    }
}
