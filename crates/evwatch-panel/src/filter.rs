//! Pure filter derivation.
//!
//! The panel recomputes its display list from (full log, filter config) on
//! every change. Keeping the derivation a pure function keeps it testable
//! without any store or channel around it.

use evwatch_core::EventRecord;

/// The panel's independent filter predicates.
///
/// Every predicate is optional; an empty one matches everything. The
/// combined predicate is the AND of all active ones.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterConfig {
    /// Case-insensitive substring over name, detail, and target.
    pub search: String,
    /// Case-sensitive name prefix.
    pub prefix: String,
    /// When false, only custom events pass.
    pub show_all: bool,
}

impl FilterConfig {
    /// Whether `record` passes every active predicate.
    #[must_use]
    pub fn matches(&self, record: &EventRecord) -> bool {
        let kind_ok = self.show_all || record.is_custom_event;

        let search_ok = self.search.is_empty() || {
            let needle = self.search.to_lowercase();
            record.name.to_lowercase().contains(&needle)
                || record.detail.to_lowercase().contains(&needle)
                || record.target.to_lowercase().contains(&needle)
        };

        let prefix_ok = self.prefix.is_empty() || record.name.starts_with(&self.prefix);

        kind_ok && search_ok && prefix_ok
    }
}

/// All records passing `filter`, in their original (chronological) order.
#[must_use]
pub fn filter_records<'a>(
    records: &'a [EventRecord],
    filter: &FilterConfig,
) -> Vec<&'a EventRecord> {
    records
        .iter()
        .filter(|record| filter.matches(record))
        .collect()
}

/// The newest `max_display` filtered records, newest first.
#[must_use]
pub fn display_window<'a>(
    filtered: &[&'a EventRecord],
    max_display: usize,
) -> Vec<&'a EventRecord> {
    let start = filtered.len().saturating_sub(max_display);
    filtered[start..].iter().rev().copied().collect()
}
