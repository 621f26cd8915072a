//! Per-rep, per-skill trend ledger types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::skill::Skill;

/// Number of most recent coaching records averaged into a rolling score.
pub const ROLLING_WINDOW: usize = 10;

/// Rolling scores strictly below this open a focus area.
pub const FOCUS_SCORE_THRESHOLD: f64 = 3.0;

/// Trend deltas strictly below this open a focus area.
pub const FOCUS_TREND_THRESHOLD: f64 = -0.5;

/// Aggregate coaching state for one rep and one skill.
///
/// Keyed by `(rep_id, skill)`. Each coaching run overwrites the entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepLedgerEntry {
    pub rep_id: String,
    #[serde(rename = "skill_id")]
    pub skill: Skill,
    pub rolling_score: f64,
    pub prev_rolling_score: f64,
    /// `rolling_score - prev_rolling_score` of this same entry.
    pub trend_delta: f64,
    pub last_updated: DateTime<Utc>,
    pub open_focus_area: bool,
}
