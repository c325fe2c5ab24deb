//! Request handlers for the transcript endpoint.

use std::sync::Arc;

use axum::{
    extract::{RawQuery, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::Instrument;
use tubescript_core::{FallbackChain, Resolved, VideoId};
use uuid::Uuid;

use crate::{
    error::ApiError,
    response::{ErrorBody, TranscriptResponse, json_response},
    server::AppState,
};

/// Query parameters of `GET /api/transcript`; the first occurrence wins.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TranscriptQuery {
    pub video_id: Option<String>,
    pub lang: Option<String>,
}

impl TranscriptQuery {
    pub fn parse(query: Option<&str>) -> Self {
        let mut out = Self::default();
        let Some(query) = query else {
            return out;
        };
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                "video_id" => &mut out.video_id,
                "lang" => &mut out.lang,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        out
    }
}

pub async fn get_transcript(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    let params = TranscriptQuery::parse(query.as_deref());

    let raw_id = params
        .video_id
        .filter(|v| !v.trim().is_empty())
        .ok_or(ApiError::MissingVideoId)?;
    let video_id =
        VideoId::parse(&raw_id).map_err(|_| ApiError::InvalidVideoId { input: raw_id })?;

    let chain = match params.lang.filter(|l| !l.trim().is_empty()) {
        Some(lang) => Arc::new(lang.parse::<FallbackChain>().map_err(|_| {
            ApiError::InvalidLanguage {
                video_id: video_id.to_string(),
                input: lang.clone(),
            }
        })?),
        None => Arc::clone(&state.chain),
    };

    let span = tracing::info_span!(
        "transcript",
        request_id = %Uuid::new_v4(),
        video_id = %video_id,
        chain = %chain,
    );

    async move {
        let resolved = lookup(&state, &video_id, &chain).await?;
        Ok(json_response(
            StatusCode::OK,
            TranscriptResponse::from(&resolved),
        ))
    }
    .instrument(span)
    .await
}

async fn lookup(
    state: &AppState,
    video_id: &VideoId,
    chain: &FallbackChain,
) -> Result<Resolved, ApiError> {
    if let Some(cache) = &state.cache
        && let Some(hit) = cache.load(video_id, chain).await
    {
        tracing::debug!("served from cache");
        return Ok(hit);
    }

    let resolved = chain
        .resolve(state.source.as_ref(), video_id)
        .await
        .map_err(|e| ApiError::from_core(video_id, e))?;

    if let Some(cache) = &state.cache
        && let Err(e) = cache.store(chain, &resolved).await
    {
        tracing::warn!(error = %e, "failed to write transcript cache");
    }

    Ok(resolved)
}

/// CORS preflight. The allow-origin header is added by the router layer.
pub async fn preflight() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
    )
}

pub async fn health() -> Response {
    json_response(StatusCode::OK, serde_json::json!({ "status": "ok" }))
}

pub async fn not_found() -> Response {
    json_response(StatusCode::NOT_FOUND, ErrorBody::new("not found"))
}
