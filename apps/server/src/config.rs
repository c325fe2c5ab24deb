use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use clap::{Parser, ValueEnum};
use tubescript_core::{FallbackChain, TranscriptCache, YtDlp, get_root_cache_dir};

use crate::server::AppState;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "tubescript-server")]
#[command(about = "Serve YouTube transcripts as JSON over HTTP")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "TUBESCRIPT_BIND", default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    /// Language fallback order; `*` means any available transcript
    #[arg(long, env = "TUBESCRIPT_LANGUAGES", default_value = tubescript_core::DEFAULT_PREFERENCES)]
    pub languages: FallbackChain,

    /// yt-dlp executable
    #[arg(long = "yt-dlp", env = "TUBESCRIPT_YTDLP", default_value = "yt-dlp")]
    pub yt_dlp: PathBuf,

    /// Extra argument passed to yt-dlp before the fixed ones (repeatable)
    #[arg(
        long = "yt-dlp-arg",
        env = "TUBESCRIPT_YTDLP_ARGS",
        value_delimiter = ',',
        allow_hyphen_values = true
    )]
    pub yt_dlp_args: Vec<String>,

    /// Wall-clock limit for each yt-dlp invocation, in seconds
    #[arg(long, env = "TUBESCRIPT_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Cache resolved transcripts on disk
    #[arg(long, env = "TUBESCRIPT_CACHE")]
    pub cache: bool,

    /// Cache directory (defaults to the user cache dir)
    #[arg(long, env = "TUBESCRIPT_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Log output format
    #[arg(long, env = "TUBESCRIPT_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl ServerConfig {
    pub fn ytdlp(&self) -> YtDlp {
        YtDlp::new(&self.yt_dlp)
            .with_extra_args(self.yt_dlp_args.iter().cloned())
            .with_timeout(Duration::from_secs(self.timeout_secs.max(1)))
    }

    pub fn transcript_cache(&self) -> Option<TranscriptCache> {
        self.cache.then(|| {
            TranscriptCache::new(self.cache_dir.clone().unwrap_or_else(get_root_cache_dir))
        })
    }

    pub fn app_state(&self) -> AppState {
        AppState::new(Arc::new(self.ytdlp()), self.languages.clone())
            .with_cache(self.transcript_cache())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::try_parse_from(["tubescript-server"]).unwrap();
        assert_eq!(config.bind, "127.0.0.1:5000".parse().unwrap());
        assert_eq!(config.languages.signature(), "ko,en,*");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.transcript_cache().is_none());
        assert_eq!(config.ytdlp().timeout(), Duration::from_secs(30));
    }

    #[test]
    fn overrides() {
        let config = ServerConfig::try_parse_from([
            "tubescript-server",
            "--bind",
            "0.0.0.0:8080",
            "--languages",
            "en,*",
            "--yt-dlp-arg",
            "--cookies,/tmp/cookies.txt",
            "--cache",
            "--cache-dir",
            "/tmp/tubescript-test",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.languages.signature(), "en,*");
        assert_eq!(config.yt_dlp_args, vec!["--cookies", "/tmp/cookies.txt"]);
        assert_eq!(config.log_format, LogFormat::Json);
        let cache = config.transcript_cache().unwrap();
        assert_eq!(cache.root(), std::path::Path::new("/tmp/tubescript-test"));
    }

    #[test]
    fn rejects_bad_language_list() {
        assert!(ServerConfig::try_parse_from(["tubescript-server", "--languages", "en;rm"]).is_err());
    }
}
