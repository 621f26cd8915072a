//! Call metadata and transcript types.
//!
//! Calls and transcripts are produced by the meeting import collaborator and
//! are read-only from the coaching pipeline's point of view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded sales call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    pub call_id: String,
    pub title: String,
    pub rep_id: String,
    pub rep_name: String,
    pub start_time: DateTime<Utc>,
    pub duration_sec: u32,
    /// Link back to the recording in the meeting source, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default = "Utc::now")]
    pub synced_at: DateTime<Utc>,
}

impl CallRecord {
    /// The subset of call metadata embedded in the coaching prompt.
    pub fn metadata(&self) -> CallMetadata {
        CallMetadata {
            title: self.title.clone(),
            rep_name: self.rep_name.clone(),
            duration_sec: self.duration_sec,
        }
    }
}

/// Call metadata shown to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallMetadata {
    pub title: String,
    pub rep_name: String,
    pub duration_sec: u32,
}

/// One contiguous stretch of speech by a single speaker.
///
/// Times are seconds from the start of the call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub speaker: String,
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
}

/// The full transcript of a call, segments in chronological order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub call_id: String,
    #[serde(default)]
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Import payload: a call plus its transcript segments.
///
/// Stand-in for the meeting-sync source; the wire format of that source is
/// deliberately not modeled here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallImport {
    pub call: CallRecord,
    #[serde(default)]
    pub segments: Vec<TranscriptSegment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_import_deserializes_with_defaults() {
        let json = r#"{
            "call": {
                "call_id": "c-1",
                "title": "Acme discovery",
                "rep_id": "rep-7",
                "rep_name": "Dana",
                "start_time": "2026-03-02T15:00:00Z",
                "duration_sec": 1800
            }
        }"#;
        let import: CallImport = serde_json::from_str(json).unwrap();
        assert_eq!(import.call.call_id, "c-1");
        assert!(import.call.source_url.is_none());
        assert!(import.segments.is_empty());
    }

    #[test]
    fn test_metadata_copies_prompt_fields() {
        let call = CallRecord {
            call_id: "c-1".into(),
            title: "Renewal".into(),
            rep_id: "rep-1".into(),
            rep_name: "Sam".into(),
            start_time: Utc::now(),
            duration_sec: 600,
            source_url: None,
            synced_at: Utc::now(),
        };
        let meta = call.metadata();
        assert_eq!(meta.title, "Renewal");
        assert_eq!(meta.rep_name, "Sam");
        assert_eq!(meta.duration_sec, 600);
    }
}
