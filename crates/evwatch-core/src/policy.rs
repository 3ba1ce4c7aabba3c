//! Page-global capture policy.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable handle to a page's capture-all flag.
///
/// The hook reads the flag on every dispatch to decide whether non-custom
/// events are captured too. The panel's capture-all toggle writes it from
/// outside the page. Defaults to off: only custom events are captured.
#[derive(Clone, Debug, Default)]
pub struct CapturePolicy {
    capture_all: Arc<AtomicBool>,
}

impl CapturePolicy {
    /// New policy with capture-all disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether non-custom dispatches should be captured as well.
    #[must_use]
    pub fn capture_all(&self) -> bool {
        self.capture_all.load(Ordering::Relaxed)
    }

    /// Turn capture-all on or off.
    pub fn set_capture_all(&self, enabled: bool) {
        self.capture_all.store(enabled, Ordering::Relaxed);
    }
}
