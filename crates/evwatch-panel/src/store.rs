//! The panel's reactive store.

use chrono::{DateTime, Utc};
use tracing::debug;

use evwatch_core::constants::{DEFAULT_DISPLAY_LIMIT, DISPLAY_INCREMENT};
use evwatch_core::{CapturePolicy, EventRecord, WatcherMessage};

use crate::display::format_payload;
use crate::export::{ExportArtifact, ExportDocument, ExportError};
use crate::filter::{FilterConfig, display_window, filter_records};

/// Sink for the mirror-to-console toggle.
///
/// Best-effort echo of newly appended records into the inspected page's
/// console. Implementations must not feed the echo back into capture.
pub trait ConsoleMirror {
    /// Echo one record.
    fn mirror(&mut self, record: &EventRecord);
}

/// Local state behind the panel UI.
///
/// The store holds one observer's copy of the event log plus every control
/// the panel exposes. It never mutates hub state; the only outward control
/// is the capture-policy write behind [`toggle_capture_all`], and only when
/// a policy handle is attached.
///
/// [`toggle_capture_all`]: PanelStore::toggle_capture_all
pub struct PanelStore {
    events: Vec<EventRecord>,
    paused: bool,
    filter: FilterConfig,
    mirror_to_console: bool,
    max_display: usize,
    last_mirrored_id: Option<u64>,
    policy: Option<CapturePolicy>,
    mirror: Option<Box<dyn ConsoleMirror>>,
}

impl PanelStore {
    /// Empty store with no capture-policy handle and no console sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            paused: false,
            filter: FilterConfig::default(),
            mirror_to_console: false,
            max_display: DEFAULT_DISPLAY_LIMIT,
            last_mirrored_id: None,
            policy: None,
            mirror: None,
        }
    }

    /// Attach the page's capture policy handle.
    #[must_use]
    pub fn with_policy(mut self, policy: CapturePolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Attach a console mirror sink.
    #[must_use]
    pub fn with_mirror(mut self, mirror: Box<dyn ConsoleMirror>) -> Self {
        self.mirror = Some(mirror);
        self
    }

    // ─────────────────────────────────────────────────────────────────────
    // Message intake
    // ─────────────────────────────────────────────────────────────────────

    /// Feed one relay message into the store.
    ///
    /// Init snapshots replace the local log outright, paused or not. New
    /// events append unless paused; paused arrivals are dropped for this
    /// panel, not queued. Page-direction messages are ignored.
    pub fn apply(&mut self, message: WatcherMessage) {
        match message {
            WatcherMessage::Init { data } => {
                debug!(records = data.len(), "panel initialized from snapshot");
                self.events = data;
                self.last_mirrored_id = None;
            }
            WatcherMessage::NewEvent { data } => {
                if self.paused {
                    return;
                }
                if self.mirror_to_console {
                    if let Some(mirror) = self.mirror.as_deref_mut() {
                        mirror.mirror(&data);
                        self.last_mirrored_id = Some(data.id);
                    }
                }
                self.events.push(data);
            }
            WatcherMessage::Event { .. } => {
                debug!("panel ignoring page-direction message");
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Controls
    // ─────────────────────────────────────────────────────────────────────

    /// Pause or resume appending of new arrivals.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Empty the local log. Hub state and other observers are unaffected.
    pub fn clear(&mut self) {
        self.events.clear();
        self.last_mirrored_id = None;
    }

    /// Set the case-insensitive search term.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filter.search = search.into();
    }

    /// Set the case-sensitive name prefix filter.
    pub fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.filter.prefix = prefix.into();
    }

    /// Turn console mirroring on or off.
    pub fn set_mirror_to_console(&mut self, enabled: bool) {
        self.mirror_to_console = enabled;
    }

    /// Flip the event-kind filter and, when a policy handle is attached,
    /// propagate the new value into the page. Returns the new value.
    pub fn toggle_capture_all(&mut self) -> bool {
        self.filter.show_all = !self.filter.show_all;
        match &self.policy {
            Some(policy) => {
                policy.set_capture_all(self.filter.show_all);
                debug!(capture_all = self.filter.show_all, "capture-all toggled");
            }
            None => {
                debug!(
                    show_all = self.filter.show_all,
                    "no capture policy attached, toggling the view filter only"
                );
            }
        }
        self.filter.show_all
    }

    /// Grow the display window by one increment, clamped to the filtered
    /// result count. No effect while everything already fits.
    pub fn show_more(&mut self) {
        let filtered = self.filtered_len();
        if filtered > self.max_display {
            self.max_display = (self.max_display + DISPLAY_INCREMENT).min(filtered);
        }
    }

    /// Set the display cap directly.
    pub fn set_max_display(&mut self, max_display: usize) {
        self.max_display = max_display;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Derivations
    // ─────────────────────────────────────────────────────────────────────

    /// Records in the local log.
    #[must_use]
    pub fn total(&self) -> usize {
        self.events.len()
    }

    /// Records passing the active filters, chronological.
    #[must_use]
    pub fn filtered(&self) -> Vec<&EventRecord> {
        filter_records(&self.events, &self.filter)
    }

    /// Number of records passing the active filters.
    #[must_use]
    pub fn filtered_len(&self) -> usize {
        self.filtered().len()
    }

    /// The capped display list, newest first.
    #[must_use]
    pub fn displayed(&self) -> Vec<&EventRecord> {
        display_window(&self.filtered(), self.max_display)
    }

    /// Current display cap.
    #[must_use]
    pub fn max_display(&self) -> usize {
        self.max_display
    }

    /// Whether new arrivals are being dropped.
    #[must_use]
    pub fn paused(&self) -> bool {
        self.paused
    }

    /// Active filter configuration.
    #[must_use]
    pub fn filter(&self) -> &FilterConfig {
        &self.filter
    }

    /// Id of the most recently mirrored record, if any.
    #[must_use]
    pub fn last_mirrored_id(&self) -> Option<u64> {
        self.last_mirrored_id
    }

    /// Formatted payload of one record, for the host clipboard facility.
    ///
    /// `None` for ids not in the local log.
    #[must_use]
    pub fn copy_payload(&self, id: u64) -> Option<String> {
        self.events
            .iter()
            .find(|record| record.id == id)
            .map(|record| format_payload(&record.detail))
    }

    /// Build the export artifact for the current filtered set.
    ///
    /// Fails with [`ExportError::Empty`] when nothing has been captured.
    pub fn export_events(&self, exported_at: DateTime<Utc>) -> Result<ExportArtifact, ExportError> {
        if self.events.is_empty() {
            return Err(ExportError::Empty);
        }
        let filtered = self.filtered();
        let document = ExportDocument::new(self.total(), &filtered, exported_at);
        ExportArtifact::build(&document, exported_at)
    }
}

impl Default for PanelStore {
    fn default() -> Self {
        Self::new()
    }
}
