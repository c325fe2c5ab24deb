use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tubescript_core::{AvailableTranscript, Resolved};

pub const JSON_UTF8: &str = "application/json; charset=utf-8";

/// Successful transcript lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptResponse {
    pub success: bool,
    pub video_id: String,
    pub language: String,
    pub is_generated: bool,
    pub transcript: String,
    /// Number of caption segments the transcript was built from.
    pub segments: usize,
    /// Character count of `transcript`.
    pub length: usize,
    pub available_transcripts: Vec<AvailableTranscript>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_transcripts: Option<Vec<AvailableTranscript>>,
}

impl From<&Resolved> for TranscriptResponse {
    fn from(resolved: &Resolved) -> Self {
        let transcript = resolved.transcript.text();
        Self {
            success: true,
            video_id: resolved.transcript.video_id.to_string(),
            language: resolved.transcript.language.clone(),
            is_generated: resolved.transcript.is_generated,
            length: transcript.chars().count(),
            segments: resolved.transcript.segment_count(),
            transcript,
            available_transcripts: resolved.available.clone(),
        }
    }
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..Default::default()
        }
    }
}

/// JSON body with an explicit UTF-8 content type.
pub fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON_UTF8));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubescript_core::{Segment, Transcript, VideoId};

    #[test]
    fn success_counts_segments_and_chars() {
        let resolved = Resolved {
            transcript: Transcript {
                video_id: VideoId::parse("dQw4w9WgXcQ").unwrap(),
                language: "ko".into(),
                is_generated: true,
                segments: vec![
                    Segment {
                        start: 0.0,
                        duration: 1.0,
                        text: "안녕".into(),
                    },
                    Segment {
                        start: 1.0,
                        duration: 1.0,
                        text: "하세요".into(),
                    },
                ],
            },
            available: vec![],
        };
        let body = TranscriptResponse::from(&resolved);
        assert!(body.success);
        assert_eq!(body.transcript, "안녕 하세요");
        assert_eq!(body.segments, 2);
        assert_eq!(body.length, 6);
    }

    #[test]
    fn error_body_omits_empty_fields() {
        let json = serde_json::to_value(ErrorBody::new("video_id is required")).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "video_id is required" }));
    }
}
