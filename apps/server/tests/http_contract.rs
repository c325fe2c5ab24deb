use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tubescript_core::{
    AvailableTranscript, FallbackChain, Result, Segment, TranscriptSource, TubescriptError, VideoId,
    YtDlp,
};
use tubescript_server::{AppState, ServerHandle, TRANSCRIPT_PATH, start};

const VIDEO: &str = "dQw4w9WgXcQ";

#[derive(Clone, Copy)]
enum Behaviour {
    Korean,
    EnglishOnly,
    NothingUsable,
    Slow,
    Panics,
}

struct StubSource {
    behaviour: Behaviour,
}

fn track(code: &str, is_generated: bool) -> AvailableTranscript {
    AvailableTranscript {
        language: code.to_uppercase(),
        language_code: code.to_string(),
        is_generated,
    }
}

fn segments(words: &[&str]) -> Vec<Segment> {
    words
        .iter()
        .enumerate()
        .map(|(i, w)| Segment {
            start: i as f64,
            duration: 1.0,
            text: w.to_string(),
        })
        .collect()
}

#[async_trait]
impl TranscriptSource for StubSource {
    async fn list(&self, _video_id: &VideoId) -> Result<Vec<AvailableTranscript>> {
        match self.behaviour {
            Behaviour::Korean => Ok(vec![track("ko", false), track("en", true)]),
            Behaviour::EnglishOnly => Ok(vec![track("en", false), track("ja", true)]),
            Behaviour::NothingUsable => Ok(vec![track("fr", true)]),
            Behaviour::Slow => Err(TubescriptError::Timeout {
                command: "yt-dlp".into(),
                after: Duration::from_secs(1),
            }),
            Behaviour::Panics => panic!("stub exploded"),
        }
    }

    async fn fetch(&self, _video_id: &VideoId, language_code: &str) -> Result<Vec<Segment>> {
        match (self.behaviour, language_code) {
            (Behaviour::Korean, "ko") => Ok(segments(&["안녕하세요", "여러분"])),
            (_, "en") => Ok(segments(&["hello", "world", "again"])),
            (_, "ja") => Ok(segments(&["こんにちは"])),
            (_, code) => Err(TubescriptError::NoSubtitleFile {
                video_id: VIDEO.into(),
                language: code.into(),
                diagnostics: format!("There are no subtitles for the requested languages ({code})"),
            }),
        }
    }
}

async fn serve(behaviour: Behaviour) -> (ServerHandle, String) {
    let state = AppState::new(Arc::new(StubSource { behaviour }), FallbackChain::default());
    let handle = start("127.0.0.1:0".parse().unwrap(), state).await.unwrap();
    let base = format!("http://{}", handle.addr());
    (handle, base)
}

async fn get_json(url: &str) -> (StatusCode, reqwest::header::HeaderMap, Value) {
    let resp = reqwest::get(url).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = resp.json::<Value>().await.unwrap();
    (status, headers, body)
}

#[tokio::test]
async fn missing_video_id_is_bad_request() {
    let (handle, base) = serve(Behaviour::Korean).await;

    for query in ["", "?video_id=", "?video_id=%20%20", "?lang=en"] {
        let (status, headers, body) = get_json(&format!("{base}{TRANSCRIPT_PATH}{query}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "query {query:?}");
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(body["error"], "video_id is required");
    }

    handle.shutdown().await;
}

#[tokio::test]
async fn malformed_video_id_is_bad_request() {
    let (handle, base) = serve(Behaviour::Korean).await;

    let (status, _, body) = get_json(&format!("{base}{TRANSCRIPT_PATH}?video_id=abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["video_id"], "abc");

    handle.shutdown().await;
}

#[tokio::test]
async fn korean_is_preferred() {
    let (handle, base) = serve(Behaviour::Korean).await;

    let (status, headers, body) = get_json(&format!("{base}{TRANSCRIPT_PATH}?video_id={VIDEO}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["content-type"], "application/json; charset=utf-8");
    assert_eq!(body["success"], true);
    assert_eq!(body["video_id"], VIDEO);
    assert_eq!(body["language"], "ko");
    assert_eq!(body["transcript"], "안녕하세요 여러분");
    assert_eq!(body["segments"], 2);
    assert_eq!(body["length"], 9);
    assert_eq!(body["available_transcripts"].as_array().unwrap().len(), 2);

    handle.shutdown().await;
}

#[tokio::test]
async fn falls_back_to_english_and_accepts_urls() {
    let (handle, base) = serve(Behaviour::EnglishOnly).await;

    let url = format!("{base}{TRANSCRIPT_PATH}?video_id=https%3A%2F%2Fyoutu.be%2F{VIDEO}");
    let (status, _, body) = get_json(&url).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["language"], "en");
    assert_eq!(body["transcript"], "hello world again");
    assert_eq!(body["video_id"], VIDEO);

    handle.shutdown().await;
}

#[tokio::test]
async fn lang_parameter_overrides_chain() {
    let (handle, base) = serve(Behaviour::EnglishOnly).await;

    let (status, _, body) = get_json(&format!("{base}{TRANSCRIPT_PATH}?video_id={VIDEO}&lang=ja")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["language"], "ja");
    assert_eq!(body["is_generated"], true);

    let (status, _, _) = get_json(&format!("{base}{TRANSCRIPT_PATH}?video_id={VIDEO}&lang=%3Brm")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    handle.shutdown().await;
}

#[tokio::test]
async fn exhausted_chain_is_not_found() {
    let (handle, base) = serve(Behaviour::NothingUsable).await;

    let (status, headers, body) = get_json(&format!("{base}{TRANSCRIPT_PATH}?video_id={VIDEO}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(body["video_id"], VIDEO);
    assert!(body["detail"].as_str().unwrap().contains("no subtitles"));
    assert_eq!(body["available_transcripts"][0]["language_code"], "fr");

    handle.shutdown().await;
}

#[tokio::test]
async fn subprocess_timeout_is_gateway_timeout() {
    let (handle, base) = serve(Behaviour::Slow).await;

    let (status, headers, body) = get_json(&format!("{base}{TRANSCRIPT_PATH}?video_id={VIDEO}")).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert!(body["detail"].as_str().unwrap().contains("timed out"));

    handle.shutdown().await;
}

#[tokio::test]
async fn panic_is_internal_error_with_cors() {
    let (handle, base) = serve(Behaviour::Panics).await;

    let (status, headers, body) = get_json(&format!("{base}{TRANSCRIPT_PATH}?video_id={VIDEO}")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(body["error"], "internal server error");

    handle.shutdown().await;
}

#[tokio::test]
async fn missing_ytdlp_is_internal_error() {
    let source = YtDlp::new("/nonexistent/bin/yt-dlp");
    let state = AppState::new(Arc::new(source), FallbackChain::default());
    let handle = start("127.0.0.1:0".parse().unwrap(), state).await.unwrap();
    let base = format!("http://{}", handle.addr());

    let (status, headers, body) = get_json(&format!("{base}{TRANSCRIPT_PATH}?video_id={VIDEO}")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(body["error"], "internal server error");
    assert_eq!(body["video_id"], VIDEO);
    assert!(body["detail"].as_str().unwrap().contains("not installed"));

    handle.shutdown().await;
}

#[tokio::test]
async fn preflight_returns_cors_headers() {
    let (handle, base) = serve(Behaviour::Korean).await;

    let resp = reqwest::Client::new()
        .request(Method::OPTIONS, format!("{base}{TRANSCRIPT_PATH}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let headers = resp.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-methods"], "GET, OPTIONS");
    assert_eq!(headers["access-control-allow-headers"], "Content-Type");

    handle.shutdown().await;
}

#[tokio::test]
async fn health_and_unknown_routes() {
    let (handle, base) = serve(Behaviour::Korean).await;

    let (status, _, body) = get_json(&format!("{base}/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, headers, body) = get_json(&format!("{base}/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(body["error"], "not found");

    handle.shutdown().await;
}
