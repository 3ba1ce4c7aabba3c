//! Ring buffer, id stamping, and observer fan-out.

use std::collections::{HashMap, VecDeque};

use metrics::{counter, gauge};
use parking_lot::Mutex;
use tracing::{debug, warn};

use evwatch_core::constants::{INIT_SNAPSHOT_LIMIT, MAX_EVENTS, OBSERVER_PORT_NAME};
use evwatch_core::record::now_ms;
use evwatch_core::{EventRecord, RecordPayload, WatcherMessage};

use crate::connection::ObserverConnection;
use crate::metrics::{
    ATTACH_REJECTED_TOTAL, EVENTS_EVICTED_TOTAL, EVENTS_RECORDED_TOTAL, FANOUT_DROPS_TOTAL,
    OBSERVERS_ACTIVE, OBSERVERS_DROPPED_TOTAL,
};

/// State guarded as one unit so every hub operation is atomic.
struct HubState {
    buffer: VecDeque<EventRecord>,
    next_id: u64,
    observers: HashMap<String, ObserverConnection>,
}

/// The event hub: stamps, buffers, and fans out records.
///
/// The buffer is a FIFO ring: once full, recording evicts the oldest
/// record. Ids stay monotonic and gapless from 1 regardless of eviction.
/// Nothing persists; counter and buffer die with the hub.
pub struct WatcherHub {
    state: Mutex<HubState>,
    capacity: usize,
}

impl WatcherHub {
    /// Hub with the standard [`MAX_EVENTS`] buffer capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MAX_EVENTS)
    }

    /// Hub with a custom buffer capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Mutex::new(HubState {
                buffer: VecDeque::with_capacity(capacity),
                next_id: 1,
                observers: HashMap::new(),
            }),
            capacity,
        }
    }

    /// Stamp and buffer one captured payload, then fan out to observers.
    ///
    /// Never fails. An observer that cannot take the message is removed
    /// after the fan-out loop; remaining observers still receive it.
    /// Returns the stamped record.
    pub fn record_event(&self, payload: RecordPayload) -> EventRecord {
        let mut state = self.state.lock();

        let id = state.next_id;
        state.next_id += 1;
        let record = EventRecord::stamp(payload, id, now_ms());

        state.buffer.push_back(record.clone());
        if state.buffer.len() > self.capacity {
            let _ = state.buffer.pop_front();
            counter!(EVENTS_EVICTED_TOTAL).increment(1);
        }
        counter!(EVENTS_RECORDED_TOTAL).increment(1);

        let message = WatcherMessage::NewEvent {
            data: record.clone(),
        };
        let mut to_remove = Vec::new();
        for conn in state.observers.values() {
            if !conn.send(message.clone()) {
                counter!(FANOUT_DROPS_TOTAL).increment(1);
                warn!(conn_id = %conn.id, event_id = record.id, "observer cannot take event, removing");
                to_remove.push(conn.id.clone());
            }
        }
        if !to_remove.is_empty() {
            for conn_id in &to_remove {
                if state.observers.remove(conn_id).is_some() {
                    counter!(OBSERVERS_DROPPED_TOTAL).increment(1);
                }
            }
            gauge!(OBSERVERS_ACTIVE).set(state.observers.len() as f64);
        }

        debug!(
            event_id = record.id,
            name = %record.name,
            observers = state.observers.len(),
            "recorded event"
        );
        record
    }

    /// Attach an observer and send it the init snapshot.
    ///
    /// Connections not named [`OBSERVER_PORT_NAME`] are rejected and
    /// dropped. The snapshot holds the most recent
    /// `min(INIT_SNAPSHOT_LIMIT, buffer len)` records in chronological
    /// order; a connection that cannot take it is dropped instead of
    /// attached.
    pub fn attach_observer(&self, conn: ObserverConnection) {
        if conn.name() != OBSERVER_PORT_NAME {
            warn!(
                conn_id = %conn.id,
                name = %conn.name(),
                "rejecting observer with unexpected connection name"
            );
            counter!(ATTACH_REJECTED_TOTAL).increment(1);
            return;
        }

        let mut state = self.state.lock();
        let start = state.buffer.len().saturating_sub(INIT_SNAPSHOT_LIMIT);
        let snapshot: Vec<EventRecord> = state.buffer.iter().skip(start).cloned().collect();
        let snapshot_len = snapshot.len();

        if !conn.send(WatcherMessage::Init { data: snapshot }) {
            warn!(conn_id = %conn.id, "observer could not take init snapshot, dropped");
            return;
        }
        debug!(conn_id = %conn.id, snapshot = snapshot_len, "observer attached");
        let _ = state.observers.insert(conn.id.clone(), conn);
        gauge!(OBSERVERS_ACTIVE).set(state.observers.len() as f64);
    }

    /// Detach an observer. Unknown ids are a no-op.
    pub fn detach_observer(&self, conn_id: &str) {
        let mut state = self.state.lock();
        if state.observers.remove(conn_id).is_some() {
            debug!(conn_id, "observer detached");
            gauge!(OBSERVERS_ACTIVE).set(state.observers.len() as f64);
        } else {
            debug!(conn_id, "detach for unknown observer ignored");
        }
    }

    /// Number of buffered records.
    pub fn len(&self) -> usize {
        self.state.lock().buffer.len()
    }

    /// True before anything has been recorded.
    pub fn is_empty(&self) -> bool {
        self.state.lock().buffer.is_empty()
    }

    /// Number of attached observers.
    pub fn observer_count(&self) -> usize {
        self.state.lock().observers.len()
    }

    /// Id the next record will be stamped with.
    pub fn next_id(&self) -> u64 {
        self.state.lock().next_id
    }
}

impl Default for WatcherHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use tokio::sync::mpsc;

    use super::*;

    fn payload(name: &str) -> RecordPayload {
        RecordPayload {
            id: 1,
            name: name.to_string(),
            ts: 1_700_000_000_000,
            detail: "null".to_string(),
            target: "document".to_string(),
            is_custom_event: true,
        }
    }

    fn observer(capacity: usize) -> (ObserverConnection, mpsc::Receiver<WatcherMessage>) {
        let (tx, rx) = mpsc::channel(capacity);
        (ObserverConnection::new(OBSERVER_PORT_NAME, tx), rx)
    }

    fn init_ids(rx: &mut mpsc::Receiver<WatcherMessage>) -> Vec<u64> {
        match rx.try_recv() {
            Ok(WatcherMessage::Init { data }) => data.iter().map(|record| record.id).collect(),
            other => panic!("expected init snapshot, got {other:?}"),
        }
    }

    #[test]
    fn new_hub_is_empty() {
        let hub = WatcherHub::new();
        assert!(hub.is_empty());
        assert_eq!(hub.observer_count(), 0);
        assert_eq!(hub.next_id(), 1);
    }

    #[test]
    fn records_are_stamped_with_monotonic_ids_from_one() {
        let hub = WatcherHub::new();
        let ids: Vec<u64> = ["a", "b", "c"]
            .into_iter()
            .map(|name| hub.record_event(payload(name)).id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(hub.next_id(), 4);
    }

    #[test]
    fn page_local_ids_are_superseded() {
        let hub = WatcherHub::new();
        let mut p = payload("x");
        p.id = 999;
        assert_eq!(hub.record_event(p).id, 1);
    }

    #[test]
    fn stamping_preserves_dispatch_time() {
        let hub = WatcherHub::new();
        let record = hub.record_event(payload("x"));
        assert_eq!(record.ts, 1_700_000_000_000);
        assert!(record.timestamp > 0);
    }

    #[test]
    fn buffer_holds_capture_order_below_capacity() {
        let hub = WatcherHub::new();
        for name in ["a", "b", "c", "d", "e"] {
            let _ = hub.record_event(payload(name));
        }
        assert_eq!(hub.len(), 5);
    }

    #[test]
    fn buffer_evicts_oldest_beyond_capacity() {
        let hub = WatcherHub::with_capacity(3);
        for _ in 0..4 {
            let _ = hub.record_event(payload("x"));
        }
        assert_eq!(hub.len(), 3);

        let (conn, mut rx) = observer(8);
        hub.attach_observer(conn);
        assert_eq!(init_ids(&mut rx), vec![2, 3, 4]);
    }

    #[test]
    fn buffer_caps_at_max_events() {
        let hub = WatcherHub::new();
        for _ in 0..(MAX_EVENTS + 1) {
            let _ = hub.record_event(payload("x"));
        }
        assert_eq!(hub.len(), MAX_EVENTS);
        assert_eq!(hub.next_id(), MAX_EVENTS as u64 + 2);
    }

    #[test]
    fn ids_stay_gapless_across_eviction() {
        let hub = WatcherHub::with_capacity(2);
        let (conn, mut rx) = observer(16);
        hub.attach_observer(conn);
        let _ = init_ids(&mut rx);

        for _ in 0..5 {
            let _ = hub.record_event(payload("x"));
        }

        let mut delivered = Vec::new();
        while let Ok(WatcherMessage::NewEvent { data }) = rx.try_recv() {
            delivered.push(data.id);
        }
        assert_eq!(delivered, vec![1, 2, 3, 4, 5]);
        assert_eq!(hub.len(), 2);
    }

    #[test]
    fn attach_snapshot_is_the_most_recent_hundred_in_order() {
        let hub = WatcherHub::new();
        for _ in 0..150 {
            let _ = hub.record_event(payload("x"));
        }

        let (conn, mut rx) = observer(8);
        hub.attach_observer(conn);

        let ids = init_ids(&mut rx);
        assert_eq!(ids.len(), INIT_SNAPSHOT_LIMIT);
        assert_eq!(ids.first(), Some(&51));
        assert_eq!(ids.last(), Some(&150));
        assert!(ids.windows(2).all(|pair| pair[1] == pair[0] + 1));
    }

    #[test]
    fn attach_snapshot_covers_a_small_buffer_entirely() {
        let hub = WatcherHub::new();
        for _ in 0..3 {
            let _ = hub.record_event(payload("x"));
        }

        let (conn, mut rx) = observer(8);
        hub.attach_observer(conn);
        assert_eq!(init_ids(&mut rx), vec![1, 2, 3]);
    }

    #[test]
    fn attach_to_an_empty_hub_sends_an_empty_snapshot() {
        let hub = WatcherHub::new();
        let (conn, mut rx) = observer(8);
        hub.attach_observer(conn);
        assert!(init_ids(&mut rx).is_empty());
        assert_eq!(hub.observer_count(), 1);
    }

    #[test]
    fn attach_rejects_unexpected_connection_names() {
        let hub = WatcherHub::new();
        let (tx, mut rx) = mpsc::channel(8);
        hub.attach_observer(ObserverConnection::new("some-other-port", tx));

        assert_eq!(hub.observer_count(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn attach_drops_a_connection_that_cannot_take_the_snapshot() {
        let hub = WatcherHub::new();
        let (tx, _rx) = mpsc::channel(1);
        tx.try_send(WatcherMessage::Init { data: Vec::new() })
            .unwrap();
        hub.attach_observer(ObserverConnection::new(OBSERVER_PORT_NAME, tx));

        assert_eq!(hub.observer_count(), 0);
    }

    #[test]
    fn detach_is_idempotent() {
        let hub = WatcherHub::new();
        let (conn, _rx) = observer(8);
        let conn_id = conn.id.clone();
        hub.attach_observer(conn);
        assert_eq!(hub.observer_count(), 1);

        hub.detach_observer(&conn_id);
        hub.detach_observer(&conn_id);
        hub.detach_observer("obs_never_seen");
        assert_eq!(hub.observer_count(), 0);
    }

    #[test]
    fn fanout_reaches_every_observer() {
        let hub = WatcherHub::new();
        let (first, mut rx1) = observer(8);
        let (second, mut rx2) = observer(8);
        hub.attach_observer(first);
        hub.attach_observer(second);
        let _ = init_ids(&mut rx1);
        let _ = init_ids(&mut rx2);

        let record = hub.record_event(payload("broadcast"));

        for rx in [&mut rx1, &mut rx2] {
            assert_matches!(
                rx.try_recv(),
                Ok(WatcherMessage::NewEvent { data }) if data == record
            );
        }
    }

    #[test]
    fn fanout_failure_removes_only_the_failing_observer() {
        let hub = WatcherHub::new();
        // Init consumes the slow observer's single slot.
        let (slow, _slow_rx) = observer(1);
        let (fast, mut fast_rx) = observer(16);
        hub.attach_observer(slow);
        hub.attach_observer(fast);
        let _ = init_ids(&mut fast_rx);
        assert_eq!(hub.observer_count(), 2);

        let record = hub.record_event(payload("squeeze"));

        assert_eq!(hub.observer_count(), 1);
        assert_matches!(
            fast_rx.try_recv(),
            Ok(WatcherMessage::NewEvent { data }) if data == record
        );
    }

    #[test]
    fn removed_observers_get_nothing_further() {
        let hub = WatcherHub::new();
        let (slow, mut slow_rx) = observer(1);
        hub.attach_observer(slow);

        let _ = hub.record_event(payload("first"));
        let _ = hub.record_event(payload("second"));

        // Only the init snapshot ever made it into the slow channel.
        assert!(init_ids(&mut slow_rx).is_empty());
        assert!(slow_rx.try_recv().is_err());
        assert_eq!(hub.observer_count(), 0);
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn retention_and_ids_hold_for_any_volume(n in 0usize..400) {
                let hub = WatcherHub::with_capacity(150);
                for _ in 0..n {
                    let _ = hub.record_event(payload("x"));
                }

                prop_assert_eq!(hub.len(), n.min(150));
                prop_assert_eq!(hub.next_id(), n as u64 + 1);

                let (conn, mut rx) = observer(1);
                hub.attach_observer(conn);
                let ids = init_ids(&mut rx);
                prop_assert_eq!(ids.len(), hub.len().min(INIT_SNAPSHOT_LIMIT));
                prop_assert!(ids.windows(2).all(|pair| pair[1] == pair[0] + 1));
                if n > 0 {
                    prop_assert_eq!(ids.last().copied(), Some(n as u64));
                }
            }
        }
    }
}
