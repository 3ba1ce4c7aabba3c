//! Observer connections.

use tokio::sync::mpsc;
use uuid::Uuid;

use evwatch_core::WatcherMessage;

/// One attached observer: a panel's end of the relay.
///
/// Messages travel as structured values over a bounded channel. Sending is
/// non-blocking; an observer that cannot take a message is dropped by the
/// hub rather than slowing the pipeline down.
#[derive(Clone, Debug)]
pub struct ObserverConnection {
    /// Unique connection id.
    pub id: String,
    name: String,
    tx: mpsc::Sender<WatcherMessage>,
}

impl ObserverConnection {
    /// New connection over `tx`, presenting itself as `name`.
    ///
    /// Only connections named [`OBSERVER_PORT_NAME`] are accepted by the
    /// hub; the name is checked at attach time, not here.
    ///
    /// [`OBSERVER_PORT_NAME`]: evwatch_core::constants::OBSERVER_PORT_NAME
    #[must_use]
    pub fn new(name: impl Into<String>, tx: mpsc::Sender<WatcherMessage>) -> Self {
        Self {
            id: format!("obs_{}", Uuid::now_v7()),
            name: name.into(),
            tx,
        }
    }

    /// The connection name presented at attach time.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Non-blocking send. False means the observer could not take the
    /// message, whether full or gone.
    pub fn send(&self, message: WatcherMessage) -> bool {
        self.tx.try_send(message).is_ok()
    }
}
