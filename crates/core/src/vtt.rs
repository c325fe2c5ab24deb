//! WebVTT → caption segments.
//!
//! Small, line-oriented and deterministic: header and block metadata is
//! dropped, timing lines become segment boundaries, cue identifiers are
//! ignored and inline markup (`<c>`, `<00:00:01.000>`, `<v Speaker>`, ...) is
//! stripped. Text order is preserved.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::Segment;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static TIMING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((?:\d+:)?\d{1,2}:\d{2}[.,]\d{1,3})\s+-->\s+((?:\d+:)?\d{1,2}:\d{2}[.,]\d{1,3})")
        .unwrap()
});

/// Parse `HH:MM:SS.mmm` or `MM:SS.mmm` into seconds.
pub fn parse_timestamp(ts: &str) -> Option<f64> {
    let ts = ts.trim().replace(',', ".");
    let parts: Vec<&str> = ts.split(':').collect();
    let (h, m, s) = match parts.as_slice() {
        [h, m, s] => (h.parse::<f64>().ok()?, m.parse::<f64>().ok()?, s.parse::<f64>().ok()?),
        [m, s] => (0.0, m.parse::<f64>().ok()?, s.parse::<f64>().ok()?),
        _ => return None,
    };
    Some(h * 3600.0 + m * 60.0 + s)
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn clean_line(line: &str) -> String {
    let stripped = TAG_RE.replace_all(line, "");
    decode_entities(&stripped)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_block_keyword(line: &str) -> bool {
    ["NOTE", "STYLE", "REGION"]
        .iter()
        .any(|kw| line == *kw || line.starts_with(&format!("{kw} ")))
}

struct Cue {
    start: f64,
    end: f64,
    lines: Vec<String>,
}

impl Cue {
    fn into_segment(self) -> Option<Segment> {
        let text = self
            .lines
            .into_iter()
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if text.is_empty() {
            return None;
        }
        Some(Segment {
            start: self.start,
            duration: (self.end - self.start).max(0.0),
            text,
        })
    }
}

/// Parse a VTT document into segments, one per non-empty cue.
pub fn parse_vtt(vtt: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current: Option<Cue> = None;
    let mut in_header = true;
    let mut skipping_block = false;

    for raw in vtt.lines() {
        let raw = raw.trim_start_matches('\u{feff}').trim_end_matches('\r');
        let line = raw.trim();

        // Only a truly empty line ends a block. YouTube puts a lone space
        // line inside its cues.
        if raw.is_empty() {
            if let Some(cue) = current.take()
                && let Some(seg) = cue.into_segment()
            {
                segments.push(seg);
            }
            in_header = false;
            skipping_block = false;
            continue;
        }

        if line.is_empty() {
            if let Some(cue) = current.as_mut() {
                cue.lines.push(String::new());
            }
            continue;
        }

        let timing = TIMING_RE.captures(line);

        // Everything up to the first blank line is file header
        // (WEBVTT, Kind:, Language:, ...).
        if (in_header && timing.is_none()) || skipping_block {
            continue;
        }
        in_header = false;

        if let Some(caps) = timing {
            if let Some(cue) = current.take()
                && let Some(seg) = cue.into_segment()
            {
                segments.push(seg);
            }
            let start = parse_timestamp(&caps[1]).unwrap_or(0.0);
            let end = parse_timestamp(&caps[2]).unwrap_or(start);
            current = Some(Cue {
                start,
                end,
                lines: Vec::new(),
            });
            continue;
        }

        match current.as_mut() {
            Some(cue) => cue.lines.push(clean_line(line)),
            None => {
                if is_block_keyword(line) {
                    skipping_block = true;
                }
                // Otherwise a cue identifier (numeric or not) before its timing line.
            }
        }
    }

    if let Some(cue) = current
        && let Some(seg) = cue.into_segment()
    {
        segments.push(seg);
    }

    segments
}

/// Flattened cue text, space-joined in document order.
pub fn vtt_to_text(vtt: &str) -> String {
    parse_vtt(vtt)
        .into_iter()
        .map(|s| s.text)
        .collect::<Vec<_>>()
        .join(" ")
}
