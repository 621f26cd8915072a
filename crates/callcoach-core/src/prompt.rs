//! Coaching prompt construction.
//!
//! The system prompt is the fixed rubric: it lists every [`Skill`] and the
//! 1-5 scale anchors. The user prompt carries call metadata, the formatted
//! transcript, and the JSON shape the model must return. Both the rubric's
//! skill list and the schema's `scores` block are rendered from
//! [`Skill::ALL`], so they cannot drift from the enumeration.

use std::sync::LazyLock;

use callcoach_types::call::CallMetadata;
use callcoach_types::skill::Skill;

/// Anchor text for each point on the scoring scale.
pub const SCORE_ANCHORS: [(u8, &str); 5] = [
    (1, "Major gaps, needs immediate attention"),
    (2, "Below expectations, significant room for improvement"),
    (3, "Meets basic expectations, some areas to refine"),
    (4, "Exceeds expectations, minor refinements possible"),
    (5, "Exceptional performance, exemplary behavior"),
];

static SYSTEM_PROMPT: LazyLock<String> = LazyLock::new(render_system_prompt);

/// The process-wide coaching rubric.
pub fn system_prompt() -> &'static str {
    SYSTEM_PROMPT.as_str()
}

/// System and user instructions for one coaching run.
#[derive(Debug, Clone)]
pub struct CoachingPrompts {
    pub system: &'static str,
    pub user: String,
}

/// Build both prompts for a call.
pub fn build_prompts(transcript: &str, metadata: &CallMetadata) -> CoachingPrompts {
    CoachingPrompts {
        system: system_prompt(),
        user: build_user_prompt(transcript, metadata),
    }
}

fn render_system_prompt() -> String {
    let skills = Skill::ALL
        .iter()
        .map(|s| format!("- {s}"))
        .collect::<Vec<_>>()
        .join("\n");
    let anchors = SCORE_ANCHORS
        .iter()
        .map(|(score, text)| format!("- {score}: {text}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are an expert sales coach analyzing sales call transcripts. \
Your role is to provide actionable, specific feedback with evidence from the transcript.

You will analyze calls against these core skills:
{skills}

For each skill, provide a score from 1-5:
{anchors}

Your feedback must be:
1. Specific - reference exact moments from the call
2. Actionable - provide clear guidance on what to do differently
3. Balanced - acknowledge strengths while addressing gaps
4. Evidence-based - always cite timestamps and quotes"
    )
}

/// The per-call instruction: metadata, transcript and required output shape.
pub fn build_user_prompt(transcript: &str, metadata: &CallMetadata) -> String {
    let score_lines = Skill::ALL
        .iter()
        .map(|s| format!("    \"{s}\": <1-5>"))
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        r#"Analyze this sales call and provide coaching feedback.

CALL METADATA:
- Title: {title}
- Sales Rep: {rep}
- Duration: {minutes} minutes

TRANSCRIPT:
{transcript}

Respond with a JSON object matching this exact structure:
{{
  "scores": {{
{score_lines}
  }},
  "strengths": ["<strength 1>", "<strength 2>", "<strength 3>"],
  "improvements": ["<improvement 1>", "<improvement 2>", "<improvement 3>"],
  "objections": [
    {{"objection": "<customer objection>", "handling": "<how rep handled it and suggestions>"}}
  ],
  "evidence": [
    {{
      "timestamp": <seconds into call>,
      "quote": "<exact quote from transcript>",
      "skill": "<which skill this demonstrates>",
      "assessment": "<why this is notable, positive or negative>"
    }}
  ],
  "summary": "<2-3 sentence overall assessment with key takeaway>"
}}

Include 3-5 evidence clips, covering both strengths and areas for improvement.
Return ONLY the JSON object, no additional text."#,
        title = metadata.title,
        rep = metadata.rep_name,
        minutes = metadata.duration_sec / 60,
    )
}
