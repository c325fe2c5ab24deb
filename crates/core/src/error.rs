use std::time::Duration;

use thiserror::Error;

use crate::types::AvailableTranscript;

#[derive(Error, Debug)]
pub enum TubescriptError {
    #[error("Invalid video id: {input:?}")]
    InvalidVideoId { input: String },

    #[error("Invalid language preference: {input:?}")]
    InvalidLanguage { input: String },

    #[error("{program} is not installed or not on PATH")]
    ToolMissing { program: String },

    #[error("{command} failed: {diagnostics}")]
    CommandFailed {
        command: String,
        diagnostics: String,
    },

    #[error("No {language} subtitle file produced for {video_id}")]
    NoSubtitleFile {
        video_id: String,
        language: String,
        diagnostics: String,
    },

    #[error("{command} timed out after {}s", .after.as_secs())]
    Timeout { command: String, after: Duration },

    #[error("No transcript found for {video_id}")]
    NotFound {
        video_id: String,
        attempted: Vec<String>,
        available: Vec<AvailableTranscript>,
        detail: Option<String>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl TubescriptError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TubescriptError::Timeout { .. })
    }

    /// Failures of the local environment rather than of one video or track.
    /// These stop a language fallback instead of advancing it.
    pub fn aborts_fallback(&self) -> bool {
        matches!(
            self,
            TubescriptError::Timeout { .. }
                | TubescriptError::ToolMissing { .. }
                | TubescriptError::IoError(_)
                | TubescriptError::JsonError(_)
        )
    }

    /// Diagnostic text worth surfacing to a caller, if the error carries any.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            TubescriptError::CommandFailed { diagnostics, .. }
            | TubescriptError::NoSubtitleFile { diagnostics, .. } => Some(diagnostics.as_str()),
            TubescriptError::NotFound { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TubescriptError>;
