//! Tubescript Core Library
//!
//! Retrieves YouTube transcripts through `yt-dlp`, falling back through an
//! ordered list of language preferences, and flattens the captions to text.

pub mod cache;
pub mod error;
pub mod fallback;
pub mod format;
pub mod source;
pub mod types;
pub mod video_id;
pub mod vtt;
pub mod ytdlp;

// Re-export commonly used items at crate root
pub use cache::{TranscriptCache, get_root_cache_dir};
pub use error::{Result, TubescriptError};
pub use fallback::{DEFAULT_PREFERENCES, FallbackChain, LanguagePreference, Resolved};
pub use format::{format_available, format_timestamp, format_transcript_with_timestamps};
pub use source::TranscriptSource;
pub use types::{AvailableTranscript, Segment, Transcript};
pub use video_id::VideoId;
pub use vtt::{parse_vtt, vtt_to_text};
pub use ytdlp::YtDlp;
