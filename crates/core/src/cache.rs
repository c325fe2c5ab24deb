use std::path::{Path, PathBuf};

use tokio::fs;

use crate::{
    error::Result,
    fallback::{FallbackChain, Resolved},
    video_id::VideoId,
};

pub fn get_root_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("tubescript")
}

/// On-disk cache of resolved transcripts, keyed by video and fallback chain.
#[derive(Debug, Clone)]
pub struct TranscriptCache {
    root: PathBuf,
}

impl Default for TranscriptCache {
    fn default() -> Self {
        Self::new(get_root_cache_dir())
    }
}

impl TranscriptCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the path for a cached transcript (chain aware)
    pub fn get_transcript_path(&self, video_id: &VideoId, chain: &FallbackChain) -> PathBuf {
        let key = chain.signature().replace('*', "any").replace(',', "_");
        self.root
            .join(video_id.as_str())
            .join(format!("transcript_{key}.json"))
    }

    /// A cached entry, or `None` if it is missing or unreadable.
    pub async fn load(&self, video_id: &VideoId, chain: &FallbackChain) -> Option<Resolved> {
        let path = self.get_transcript_path(video_id, chain);
        let json_content = fs::read_to_string(&path).await.ok()?;
        match serde_json::from_str(&json_content) {
            Ok(resolved) => Some(resolved),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt cache entry");
                None
            }
        }
    }

    pub async fn store(&self, chain: &FallbackChain, resolved: &Resolved) -> Result<PathBuf> {
        let path = self.get_transcript_path(&resolved.transcript.video_id, chain);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let pretty_json = serde_json::to_string_pretty(resolved)?;
        fs::write(&path, &pretty_json).await?;
        Ok(path)
    }
}
