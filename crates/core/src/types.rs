use serde::{Deserialize, Serialize};

use crate::video_id::VideoId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub video_id: VideoId,
    pub language: String,
    pub is_generated: bool,
    pub segments: Vec<Segment>,
}

/// One timed caption cue. Times are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub duration: f64,
    pub text: String,
}

/// An entry in the list of transcripts a video offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableTranscript {
    pub language: String,
    pub language_code: String,
    pub is_generated: bool,
}

impl Segment {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

impl Transcript {
    /// Segment texts joined by single spaces, in original order.
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|seg| seg.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn duration_seconds(&self) -> f64 {
        self.segments.last().map(Segment::end).unwrap_or(0.0)
    }

    /// Auto-generated tracks scroll: each cue repeats the line already shown
    /// and appends a new one, and short snapshot cues repeat it once more.
    /// Drop segments identical to the previous one and strip a carried-over
    /// leading line so every line appears once.
    pub fn collapse_rolling_repeats(&mut self) {
        let mut previous: Option<String> = None;
        let mut kept = Vec::with_capacity(self.segments.len());

        for mut seg in self.segments.drain(..) {
            if let Some(prev) = previous.as_deref() {
                if seg.text == prev {
                    continue;
                }
                let carried = seg
                    .text
                    .strip_prefix(prev)
                    .and_then(|rest| rest.strip_prefix(' '))
                    .map(str::to_string);
                if let Some(rest) = carried {
                    seg.text = rest;
                }
            }
            previous = Some(seg.text.clone());
            kept.push(seg);
        }

        self.segments = kept;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: f64, text: &str) -> Segment {
        Segment {
            start,
            duration: 1.5,
            text: text.to_string(),
        }
    }

    fn transcript(segments: Vec<Segment>) -> Transcript {
        Transcript {
            video_id: "dQw4w9WgXcQ".parse().unwrap(),
            language: "en".to_string(),
            is_generated: false,
            segments,
        }
    }

    #[test]
    fn text_is_space_joined_in_order() {
        let t = transcript(vec![seg(0.0, "never gonna"), seg(1.0, "give you"), seg(2.0, "up")]);
        assert_eq!(t.text(), "never gonna give you up");
        assert_eq!(t.segment_count(), 3);
    }

    #[test]
    fn empty_transcript_has_empty_text() {
        let t = transcript(vec![]);
        assert_eq!(t.text(), "");
        assert_eq!(t.duration_seconds(), 0.0);
    }

    #[test]
    fn collapse_only_touches_consecutive_repeats() {
        let mut t = transcript(vec![
            seg(0.0, "hello"),
            seg(1.0, "hello"),
            seg(2.0, "world"),
            seg(3.0, "hello"),
        ]);
        t.collapse_rolling_repeats();
        let texts: Vec<_> = t.segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["hello", "world", "hello"]);
    }

    #[test]
    fn collapse_unrolls_scrolling_captions() {
        let mut t = transcript(vec![
            seg(0.0, "hello everyone"),
            seg(2.35, "hello everyone"),
            seg(2.36, "hello everyone welcome to the show"),
            seg(5.0, "welcome to the show"),
            seg(5.01, "welcome to the show and thanks"),
        ]);
        t.collapse_rolling_repeats();
        assert_eq!(t.text(), "hello everyone welcome to the show and thanks");
        assert_eq!(t.segment_count(), 3);
        assert_eq!(t.segments[1].start, 2.36);
    }

    #[test]
    fn collapse_keeps_partial_word_overlap() {
        let mut t = transcript(vec![seg(0.0, "go"), seg(1.0, "gone")]);
        t.collapse_rolling_repeats();
        assert_eq!(t.text(), "go gone");
    }

    #[test]
    fn duration_uses_last_segment_end() {
        let t = transcript(vec![seg(0.0, "a"), seg(10.0, "b")]);
        assert_eq!(t.duration_seconds(), 11.5);
    }
}
