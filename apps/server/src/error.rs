use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tubescript_core::{AvailableTranscript, TubescriptError, VideoId};

use crate::response::{ErrorBody, json_response};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("video_id is required")]
    MissingVideoId,

    #[error("invalid video_id")]
    InvalidVideoId { input: String },

    #[error("invalid lang")]
    InvalidLanguage { video_id: String, input: String },

    #[error("no transcript available")]
    NotFound {
        video_id: String,
        detail: Option<String>,
        available: Vec<AvailableTranscript>,
    },

    #[error("transcript lookup timed out")]
    Timeout { video_id: String, detail: String },

    #[error("internal server error")]
    Internal {
        video_id: Option<String>,
        detail: String,
    },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingVideoId
            | ApiError::InvalidVideoId { .. }
            | ApiError::InvalidLanguage { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Classify a core failure for `video_id`.
    pub fn from_core(video_id: &VideoId, err: TubescriptError) -> Self {
        let video_id = video_id.to_string();
        match err {
            TubescriptError::NotFound {
                available, detail, ..
            } => ApiError::NotFound {
                video_id,
                detail,
                available,
            },
            e @ TubescriptError::Timeout { .. } => ApiError::Timeout {
                video_id,
                detail: e.to_string(),
            },
            e => ApiError::Internal {
                video_id: Some(video_id),
                detail: e.to_string(),
            },
        }
    }

    fn body(self) -> ErrorBody {
        let error = self.to_string();
        match self {
            ApiError::MissingVideoId => ErrorBody::new(error),
            ApiError::InvalidVideoId { input } => ErrorBody {
                error,
                video_id: Some(input),
                detail: Some("expected an 11 character YouTube video id or URL".to_string()),
                ..Default::default()
            },
            ApiError::InvalidLanguage { video_id, input } => ErrorBody {
                error,
                video_id: Some(video_id),
                detail: Some(format!("unsupported language preference list: {input:?}")),
                ..Default::default()
            },
            ApiError::NotFound {
                video_id,
                detail,
                available,
            } => ErrorBody {
                error,
                video_id: Some(video_id),
                detail,
                available_transcripts: Some(available),
            },
            ApiError::Timeout { video_id, detail } => ErrorBody {
                error,
                video_id: Some(video_id),
                detail: Some(detail),
                ..Default::default()
            },
            ApiError::Internal { video_id, detail } => ErrorBody {
                error,
                video_id,
                detail: Some(detail),
                ..Default::default()
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = ?self, "request failed");
        }
        json_response(status, self.body())
    }
}

/// Turns a handler panic into the generic 500 body.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    ApiError::Internal {
        video_id: None,
        detail,
    }
    .into_response()
}
