//! Ordered language fallback.
//!
//! A chain is a short list of fallible attempts evaluated in order until one
//! yields a transcript. Individual failures only advance the chain; a timeout
//! of the external tool, or the tool being unusable, aborts it.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, TubescriptError},
    source::TranscriptSource,
    types::{AvailableTranscript, Transcript},
    video_id::VideoId,
};

pub const DEFAULT_PREFERENCES: &str = "ko,en,*";

const ORIGINAL_SUFFIX: &str = "-orig";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguagePreference {
    Code(String),
    AnyAvailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackChain {
    preferences: Vec<LanguagePreference>,
}

/// A transcript together with the catalog it was chosen from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolved {
    pub transcript: Transcript,
    pub available: Vec<AvailableTranscript>,
}

fn is_language_code(s: &str) -> bool {
    (1..=16).contains(&s.len())
        && s.starts_with(|c: char| c.is_ascii_alphanumeric())
        && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

impl FromStr for LanguagePreference {
    type Err = TubescriptError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s == "*" || s.eq_ignore_ascii_case("any") {
            return Ok(Self::AnyAvailable);
        }
        if is_language_code(s) {
            return Ok(Self::Code(s.to_string()));
        }
        Err(TubescriptError::InvalidLanguage {
            input: s.to_string(),
        })
    }
}

impl fmt::Display for LanguagePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguagePreference::Code(code) => f.write_str(code),
            LanguagePreference::AnyAvailable => f.write_str("*"),
        }
    }
}

impl Default for FallbackChain {
    fn default() -> Self {
        Self {
            preferences: vec![
                LanguagePreference::Code("ko".to_string()),
                LanguagePreference::Code("en".to_string()),
                LanguagePreference::AnyAvailable,
            ],
        }
    }
}

impl FromStr for FallbackChain {
    type Err = TubescriptError;

    /// Comma separated, e.g. `ko,en,*`.
    fn from_str(s: &str) -> Result<Self> {
        let preferences = s
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<LanguagePreference>>>()?;
        Self::new(preferences).ok_or_else(|| TubescriptError::InvalidLanguage {
            input: s.to_string(),
        })
    }
}

impl fmt::Display for FallbackChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature())
    }
}

/// Catalog entry for `code`, manual tracks before generated ones.
fn find_track<'a>(available: &'a [AvailableTranscript], code: &str) -> Option<&'a AvailableTranscript> {
    let original = format!("{code}{ORIGINAL_SUFFIX}");
    let matches = |t: &&AvailableTranscript| {
        t.language_code.eq_ignore_ascii_case(code) || t.language_code.eq_ignore_ascii_case(&original)
    };
    available
        .iter()
        .filter(matches)
        .find(|t| !t.is_generated)
        .or_else(|| available.iter().find(matches))
}

impl FallbackChain {
    /// `None` when `preferences` is empty.
    pub fn new(preferences: Vec<LanguagePreference>) -> Option<Self> {
        if preferences.is_empty() {
            None
        } else {
            Some(Self { preferences })
        }
    }

    pub fn preferences(&self) -> &[LanguagePreference] {
        &self.preferences
    }

    /// Stable textual form, e.g. `ko,en,*`.
    pub fn signature(&self) -> String {
        self.preferences
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub async fn resolve(&self, source: &dyn TranscriptSource, video_id: &VideoId) -> Result<Resolved> {
        let available = match source.list(video_id).await {
            Ok(available) => available,
            Err(e) if e.aborts_fallback() => return Err(e),
            Err(e) => {
                tracing::warn!(video_id = %video_id, error = %e, "transcript listing failed");
                return Err(TubescriptError::NotFound {
                    video_id: video_id.to_string(),
                    attempted: Vec::new(),
                    available: Vec::new(),
                    detail: Some(e.diagnostics().map(str::to_string).unwrap_or_else(|| e.to_string())),
                });
            }
        };

        let mut attempted: Vec<String> = Vec::new();
        let mut detail: Option<String> = None;

        for preference in &self.preferences {
            let track = match preference {
                LanguagePreference::Code(code) => find_track(&available, code),
                LanguagePreference::AnyAvailable => available
                    .iter()
                    .find(|t| !attempted.contains(&t.language_code)),
            };

            let Some(track) = track else {
                tracing::debug!(video_id = %video_id, preference = %preference, "no matching track");
                continue;
            };
            if attempted.contains(&track.language_code) {
                continue;
            }
            attempted.push(track.language_code.clone());

            tracing::debug!(
                video_id = %video_id,
                language = %track.language_code,
                generated = track.is_generated,
                "fetching transcript"
            );

            match source.fetch(video_id, &track.language_code).await {
                Ok(segments) if !segments.is_empty() => {
                    let mut transcript = Transcript {
                        video_id: video_id.clone(),
                        language: track
                            .language_code
                            .trim_end_matches(ORIGINAL_SUFFIX)
                            .to_string(),
                        is_generated: track.is_generated,
                        segments,
                    };
                    if transcript.is_generated {
                        transcript.collapse_rolling_repeats();
                    }
                    tracing::info!(
                        video_id = %video_id,
                        language = %transcript.language,
                        segments = transcript.segment_count(),
                        "transcript resolved"
                    );
                    return Ok(Resolved {
                        transcript,
                        available,
                    });
                }
                Ok(_) => {
                    tracing::warn!(video_id = %video_id, language = %track.language_code, "empty transcript");
                    detail = Some(format!("{} transcript is empty", track.language_code));
                }
                Err(e) if e.aborts_fallback() => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        video_id = %video_id,
                        language = %track.language_code,
                        error = %e,
                        "transcript attempt failed"
                    );
                    detail = Some(e.diagnostics().map(str::to_string).unwrap_or_else(|| e.to_string()));
                }
            }
        }

        Err(TubescriptError::NotFound {
            video_id: video_id.to_string(),
            attempted,
            available,
            detail,
        })
    }
}
