//! Coaching artifact and persisted coaching record types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::call::CallRecord;
use crate::skill::Skill;

/// Schema version stamped on every persisted coaching record.
pub const COACHING_VERSION: &str = "1.0";

/// Lowest score on the rubric scale.
pub const MIN_SCORE: u8 = 1;

/// Highest score on the rubric scale.
pub const MAX_SCORE: u8 = 5;

/// Score assigned to a skill the model did not score.
pub const DEFAULT_SKILL_SCORE: u8 = 3;

/// Round a raw numeric score to the nearest integer on the 1-5 scale.
///
/// Non-finite input maps to [`DEFAULT_SKILL_SCORE`].
pub fn normalize_score(raw: f64) -> u8 {
    if !raw.is_finite() {
        return DEFAULT_SKILL_SCORE;
    }
    raw.round().clamp(MIN_SCORE as f64, MAX_SCORE as f64) as u8
}

/// Per-skill scores, ordered by [`Skill::ALL`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillScores(BTreeMap<Skill, u8>);

impl SkillScores {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// All eight skills set to the same score.
    pub fn uniform(score: u8) -> Self {
        Self(Skill::ALL.iter().map(|s| (*s, score)).collect())
    }

    pub fn insert(&mut self, skill: Skill, score: u8) {
        self.0.insert(skill, score);
    }

    pub fn get(&self, skill: Skill) -> Option<u8> {
        self.0.get(&skill).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Skill, u8)> + '_ {
        self.0.iter().map(|(s, v)| (*s, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every skill in the enumeration has a score.
    pub fn is_complete(&self) -> bool {
        Skill::ALL.iter().all(|s| self.0.contains_key(s))
    }

    /// Unweighted mean of the present scores, `None` when empty.
    pub fn mean(&self) -> Option<f64> {
        if self.0.is_empty() {
            return None;
        }
        let total: u32 = self.0.values().map(|v| u32::from(*v)).sum();
        Some(f64::from(total) / self.0.len() as f64)
    }

    /// Read scores from loosely-typed stored JSON.
    ///
    /// Keys that are not skill names and values that are not numbers are
    /// ignored; a non-object value yields empty scores. Records written by
    /// older schema versions may therefore be missing skills.
    pub fn from_value_lenient(value: &serde_json::Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::new();
        };
        let mut scores = Self::new();
        for skill in Skill::ALL {
            if let Some(raw) = map.get(skill.as_str()).and_then(|v| v.as_f64()) {
                scores.insert(skill, normalize_score(raw));
            }
        }
        scores
    }
}

impl FromIterator<(Skill, u8)> for SkillScores {
    fn from_iter<T: IntoIterator<Item = (Skill, u8)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A customer objection and how the rep handled it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Objection {
    pub objection: String,
    pub handling: String,
}

/// A quoted moment from the call supporting an assessment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Evidence {
    /// Seconds into the call.
    pub timestamp: f64,
    pub quote: String,
    /// Skill name as returned by the model; not checked against [`Skill`].
    pub skill: String,
    pub assessment: String,
}

/// Structured coaching output for one transcript analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachingArtifact {
    pub scores: SkillScores,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub objections: Vec<Objection>,
    pub evidence: Vec<Evidence>,
    pub summary: String,
}

/// Persisted form of a coaching artifact.
///
/// Records are append-only: re-coaching a call adds a new record and the
/// newest one supersedes the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachingRecord {
    pub id: Uuid,
    pub call_id: String,
    pub rep_id: String,
    pub coached_at: DateTime<Utc>,
    pub model_id: String,
    pub scores: SkillScores,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub objections: Vec<Objection>,
    pub evidence: Vec<Evidence>,
    pub summary: String,
    pub version: String,
}

impl CoachingRecord {
    /// Build a new record for `call` from a validated artifact.
    pub fn new(
        call: &CallRecord,
        artifact: CoachingArtifact,
        model_id: &str,
        coached_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            call_id: call.call_id.clone(),
            rep_id: call.rep_id.clone(),
            coached_at,
            model_id: model_id.to_string(),
            scores: artifact.scores,
            strengths: artifact.strengths,
            improvements: artifact.improvements,
            objections: artifact.objections,
            evidence: artifact.evidence,
            summary: artifact.summary,
            version: COACHING_VERSION.to_string(),
        }
    }

    /// The artifact fields of this record.
    pub fn artifact(&self) -> CoachingArtifact {
        CoachingArtifact {
            scores: self.scores.clone(),
            strengths: self.strengths.clone(),
            improvements: self.improvements.clone(),
            objections: self.objections.clone(),
            evidence: self.evidence.clone(),
            summary: self.summary.clone(),
        }
    }
}
