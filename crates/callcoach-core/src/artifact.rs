//! Validation and repair of raw model output into a [`CoachingArtifact`].
//!
//! Parsing is a two-step search for a JSON value: the whole text first, then
//! the greedy `{ ... }` span from the first `{` to the last `}` (models like
//! to wrap JSON in prose or code fences). The parsed value is then mapped
//! field by field:
//!
//! | field          | accepted                 | otherwise                |
//! |----------------|--------------------------|--------------------------|
//! | `scores`       | object                   | [`ArtifactError::MissingScores`] |
//! | each skill     | number, rounded to 1..=5 | [`DEFAULT_SKILL_SCORE`]  |
//! | `strengths`    | array of strings         | `[]`                     |
//! | `improvements` | array of strings         | `[]`                     |
//! | `objections`   | array of objects         | `[]`                     |
//! | `evidence`     | array of objects         | `[]`                     |
//! | `summary`      | string                   | `""`                     |
//!
//! Array items of the wrong shape are dropped.

use serde_json::{Map, Value};
use tracing::debug;

use callcoach_types::coaching::{
    CoachingArtifact, DEFAULT_SKILL_SCORE, Evidence, Objection, SkillScores, normalize_score,
};
use callcoach_types::error::ArtifactError;
use callcoach_types::skill::Skill;

/// Parse and repair raw provider text into a fully-populated artifact.
pub fn parse_artifact(raw: &str) -> Result<CoachingArtifact, ArtifactError> {
    let value = parse_json(raw)?;
    repair(value)
}

/// The greedy brace span of `text`: first `{` through last `}`.
pub fn extract_braced_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}

fn parse_json(raw: &str) -> Result<Value, ArtifactError> {
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(raw.trim()) {
        return Ok(value);
    }
    let span = extract_braced_span(raw).ok_or(ArtifactError::MalformedResponse)?;
    debug!(
        skipped = raw.len() - span.len(),
        "parsing embedded JSON object"
    );
    serde_json::from_str(span).map_err(|_| ArtifactError::MalformedResponse)
}

fn repair(value: Value) -> Result<CoachingArtifact, ArtifactError> {
    let Value::Object(mut obj) = value else {
        return Err(ArtifactError::MissingScores);
    };

    let scores = match obj.remove("scores") {
        Some(Value::Object(map)) => repair_scores(&map),
        _ => return Err(ArtifactError::MissingScores),
    };

    Ok(CoachingArtifact {
        scores,
        strengths: string_list(obj.remove("strengths")),
        improvements: string_list(obj.remove("improvements")),
        objections: object_list(obj.remove("objections"), objection_from),
        evidence: object_list(obj.remove("evidence"), evidence_from),
        summary: match obj.remove("summary") {
            Some(Value::String(s)) => s,
            _ => String::new(),
        },
    })
}

fn repair_scores(map: &Map<String, Value>) -> SkillScores {
    let mut defaulted = 0;
    let scores = Skill::ALL
        .iter()
        .map(|skill| {
            let score = match map.get(skill.as_str()).and_then(Value::as_f64) {
                Some(raw) => normalize_score(raw),
                None => {
                    defaulted += 1;
                    DEFAULT_SKILL_SCORE
                }
            };
            (*skill, score)
        })
        .collect();
    if defaulted > 0 {
        debug!(defaulted, "filled missing skill scores");
    }
    scores
}

fn string_list(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn object_list<T>(value: Option<Value>, convert: fn(&Map<String, Value>) -> T) -> Vec<T> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_object)
            .map(convert)
            .collect(),
        _ => Vec::new(),
    }
}

fn str_field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn objection_from(obj: &Map<String, Value>) -> Objection {
    Objection {
        objection: str_field(obj, "objection"),
        handling: str_field(obj, "handling"),
    }
}

fn evidence_from(obj: &Map<String, Value>) -> Evidence {
    Evidence {
        timestamp: obj
            .get("timestamp")
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
            .max(0.0),
        quote: str_field(obj, "quote"),
        skill: str_field(obj, "skill"),
        assessment: str_field(obj, "assessment"),
    }
}
