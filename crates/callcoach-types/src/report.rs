//! Read-side views over calls, coaching records and the ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::call::{CallRecord, TranscriptSegment};
use crate::coaching::{CoachingArtifact, SkillScores};
use crate::ledger::RepLedgerEntry;

/// A call in the call list, flagged when it has been coached at least once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallSummary {
    #[serde(flatten)]
    pub call: CallRecord,
    pub coached: bool,
}

/// A call with its transcript and latest coaching artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallDetail {
    #[serde(flatten)]
    pub call: CallRecord,
    pub transcript: Vec<TranscriptSegment>,
    pub coaching: Option<CoachingArtifact>,
}

/// Per-rep roll-up for the rep list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepSummary {
    pub rep_id: String,
    pub rep_name: String,
    pub call_count: usize,
    /// Mean over coaching records of each record's mean skill score.
    pub avg_score: Option<f64>,
}

/// A rep's ledger trends plus recent coaching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepDetail {
    pub rep_id: String,
    pub rep_name: String,
    pub trends: Vec<RepLedgerEntry>,
    pub recent_coaching: Vec<RecentCoaching>,
}

/// One line of a rep's recent coaching history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentCoaching {
    pub call_id: String,
    pub call_title: String,
    pub coached_at: DateTime<Utc>,
    pub summary: String,
    pub scores: SkillScores,
}
