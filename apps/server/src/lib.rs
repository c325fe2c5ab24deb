//! HTTP front end for tubescript.
//!
//! Exposes `GET /api/transcript?video_id=...` which resolves a transcript
//! through the configured language fallback chain and returns it as JSON.

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod server;
pub mod telemetry;

pub use config::{LogFormat, ServerConfig};
pub use error::ApiError;
pub use server::{AppState, ServerHandle, TRANSCRIPT_PATH, build_router, start};
