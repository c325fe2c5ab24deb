use crate::types::{AvailableTranscript, Transcript};

/// `MM:SS`, or `H:MM:SS` from the first hour on.
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let (hours, mins, secs) = (total / 3600, total / 60 % 60, total % 60);
    if hours > 0 {
        format!("{hours}:{mins:02}:{secs:02}")
    } else {
        format!("{mins:02}:{secs:02}")
    }
}

/// Format transcript segments with timestamps
pub fn format_transcript_with_timestamps(transcript: &Transcript) -> String {
    transcript
        .segments
        .iter()
        .map(|seg| format!("[{}] {}", format_timestamp(seg.start), seg.text.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per available transcript, e.g. `ko  Korean (auto)`.
pub fn format_available(available: &[AvailableTranscript]) -> String {
    available
        .iter()
        .map(|t| {
            let kind = if t.is_generated { " (auto)" } else { "" };
            format!("{:<10} {}{}", t.language_code, t.language, kind)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
