//! Transcript formatting for model input.

use callcoach_types::call::TranscriptSegment;

/// Format seconds-from-start as `m:ss`, truncating fractional seconds.
///
/// Negative and non-finite values render as `0:00`.
pub fn format_timestamp(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.trunc() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// Render segments as one `[m:ss] Speaker: text` line each, in input order.
///
/// Line breaks inside a segment's text are flattened to spaces so the
/// one-line-per-segment shape holds.
pub fn format_transcript(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|seg| {
            format!(
                "[{}] {}: {}",
                format_timestamp(seg.start_time),
                seg.speaker,
                seg.text.replace(['\r', '\n'], " ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
