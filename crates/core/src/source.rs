use async_trait::async_trait;

use crate::{
    error::Result,
    types::{AvailableTranscript, Segment},
    video_id::VideoId,
};

/// Something that can enumerate and fetch caption tracks for a video.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Transcripts the video offers, manual tracks first.
    async fn list(&self, video_id: &VideoId) -> Result<Vec<AvailableTranscript>>;

    /// Timed segments of the track in `language_code`.
    async fn fetch(&self, video_id: &VideoId, language_code: &str) -> Result<Vec<Segment>>;
}
