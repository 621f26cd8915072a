//! The fixed, ordered set of coached sales skills.
//!
//! The enumeration is a closed schema: the rubric text sent to the model,
//! the output schema, the validator and the ledger all iterate
//! [`Skill::ALL`]. Adding a skill is a schema version bump
//! (see [`crate::coaching::COACHING_VERSION`]).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A coached sales skill.
///
/// Serialized as its human-readable name (e.g. `"Active Listening"`), which
/// is also the key the language model is asked to echo back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Skill {
    #[serde(rename = "Discovery")]
    Discovery,
    #[serde(rename = "Active Listening")]
    ActiveListening,
    #[serde(rename = "Value Articulation")]
    ValueArticulation,
    #[serde(rename = "Objection Handling")]
    ObjectionHandling,
    #[serde(rename = "Closing")]
    Closing,
    #[serde(rename = "Rapport Building")]
    RapportBuilding,
    #[serde(rename = "Product Knowledge")]
    ProductKnowledge,
    #[serde(rename = "Competitive Positioning")]
    CompetitivePositioning,
}

impl Skill {
    /// Every skill, in rubric order.
    pub const ALL: [Skill; 8] = [
        Skill::Discovery,
        Skill::ActiveListening,
        Skill::ValueArticulation,
        Skill::ObjectionHandling,
        Skill::Closing,
        Skill::RapportBuilding,
        Skill::ProductKnowledge,
        Skill::CompetitivePositioning,
    ];

    /// The canonical display name, also used as the storage `skill_id`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Skill::Discovery => "Discovery",
            Skill::ActiveListening => "Active Listening",
            Skill::ValueArticulation => "Value Articulation",
            Skill::ObjectionHandling => "Objection Handling",
            Skill::Closing => "Closing",
            Skill::RapportBuilding => "Rapport Building",
            Skill::ProductKnowledge => "Product Knowledge",
            Skill::CompetitivePositioning => "Competitive Positioning",
        }
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Skill {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Skill::ALL
            .iter()
            .copied()
            .find(|skill| skill.as_str() == s)
            .ok_or_else(|| format!("invalid skill: '{s}'"))
    }
}
