//! Filtered-set export.
//!
//! Export serializes the current filtered set plus a result summary into a
//! pretty-printed JSON artifact. The artifact goes to whatever download
//! facility the host provides; the store itself never touches the
//! filesystem.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;

use evwatch_core::EventRecord;

/// Why an export produced no artifact.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Nothing captured yet; there is nothing worth writing.
    #[error("no events to export")]
    Empty,
    /// The export document could not be serialized.
    #[error("failed to serialize export document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Host-provided download facility.
///
/// Given an artifact it either lands it or reports failure; there is no
/// richer feedback.
pub trait Downloader {
    /// Persist `artifact` wherever downloads go.
    fn download(&mut self, artifact: &ExportArtifact) -> std::io::Result<()>;
}

/// One exported record row.
///
/// Rows carry the dispatch time as `timestamp` and drop the event-kind
/// marker; this is the shape the artifact promises, independent of the
/// internal record layout.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    /// Hub-assigned record id.
    pub id: u64,
    /// Event name.
    pub name: String,
    /// Dispatch wall-clock time in milliseconds.
    pub timestamp: u64,
    /// Dispatch target descriptor.
    pub target: String,
    /// Rendered detail payload.
    pub detail: String,
}

impl From<&EventRecord> for ExportRow {
    fn from(record: &EventRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            timestamp: record.ts,
            target: record.target.clone(),
            detail: record.detail.clone(),
        }
    }
}

/// The export document: summary plus filtered rows in filter order.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    /// Export time, ISO 8601 with millisecond precision.
    pub timestamp: String,
    /// Records in the panel's local log.
    pub total_events: usize,
    /// Records passing the active filters.
    pub filtered_events: usize,
    /// The filtered records.
    pub events: Vec<ExportRow>,
}

impl ExportDocument {
    /// Document over `filtered` records out of `total`, stamped
    /// `exported_at`.
    #[must_use]
    pub fn new(total: usize, filtered: &[&EventRecord], exported_at: DateTime<Utc>) -> Self {
        Self {
            timestamp: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            total_events: total,
            filtered_events: filtered.len(),
            events: filtered.iter().copied().map(ExportRow::from).collect(),
        }
    }
}

/// A named byte buffer ready for the download facility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Timestamped download filename.
    pub filename: String,
    /// Pretty-printed JSON document.
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Serialize `document` under the timestamped export filename.
    pub fn build(
        document: &ExportDocument,
        exported_at: DateTime<Utc>,
    ) -> Result<Self, ExportError> {
        Ok(Self {
            filename: export_filename(exported_at),
            bytes: serde_json::to_vec_pretty(document)?,
        })
    }
}

/// Download filename for an export taken at `at`.
///
/// Second precision, colons replaced so the name is filesystem-safe.
#[must_use]
pub fn export_filename(at: DateTime<Utc>) -> String {
    format!("event-watcher-export-{}.json", at.format("%Y-%m-%dT%H-%M-%S"))
}

#[cfg(test)]
mod tests {
    use evwatch_core::RecordPayload;

    use super::*;

    fn record(id: u64, name: &str) -> EventRecord {
        EventRecord::stamp(
            RecordPayload {
                id,
                name: name.to_string(),
                ts: 1_700_000_000_000 + id,
                detail: "{\"ok\": true}".to_string(),
                target: "#app".to_string(),
                is_custom_event: true,
            },
            id,
            1_700_000_000_500 + id,
        )
    }

    fn exported_at() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_123).unwrap()
    }

    #[test]
    fn filename_is_second_precise_and_colon_free() {
        let name = export_filename(exported_at());
        assert_eq!(name, "event-watcher-export-2023-11-14T22-13-20.json");
        assert!(!name.contains(':'));
    }

    #[test]
    fn document_counts_and_rows_follow_the_filtered_set() {
        let records = vec![record(1, "a"), record(2, "b"), record(3, "c")];
        let filtered: Vec<&EventRecord> = records.iter().skip(1).collect();

        let document = ExportDocument::new(records.len(), &filtered, exported_at());

        assert_eq!(document.total_events, 3);
        assert_eq!(document.filtered_events, 2);
        let ids: Vec<u64> = document.events.iter().map(|row| row.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn rows_use_the_dispatch_time_and_drop_the_kind_marker() {
        let records = vec![record(7, "x")];
        let filtered: Vec<&EventRecord> = records.iter().collect();
        let document = ExportDocument::new(1, &filtered, exported_at());

        let json = serde_json::to_value(&document).unwrap();
        assert_eq!(json["events"][0]["timestamp"], 1_700_000_000_007_u64);
        assert!(json["events"][0].get("isCustomEvent").is_none());
        assert!(json["events"][0].get("ts").is_none());
    }

    #[test]
    fn document_serializes_with_camel_case_summary() {
        let document = ExportDocument::new(0, &[], exported_at());
        let json = serde_json::to_string(&document).unwrap();
        assert!(json.contains("\"totalEvents\":0"));
        assert!(json.contains("\"filteredEvents\":0"));
        assert!(json.contains("\"timestamp\":\"2023-11-14T22:13:20.123Z\""));
    }

    #[test]
    fn artifact_bytes_are_pretty_printed_json() {
        let records = vec![record(1, "a")];
        let filtered: Vec<&EventRecord> = records.iter().collect();
        let document = ExportDocument::new(1, &filtered, exported_at());

        let artifact = ExportArtifact::build(&document, exported_at()).unwrap();
        let text = String::from_utf8(artifact.bytes).unwrap();
        assert!(text.starts_with("{\n  \"timestamp\""));
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["filteredEvents"], 1);
    }
}
