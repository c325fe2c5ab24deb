//! `yt-dlp` as a transcript source.
//!
//! Listing uses the JSON metadata dump (`-J`); fetching downloads a single
//! VTT track into a throwaway directory and parses it. Every invocation runs
//! under a wall-clock timeout and the child is killed when it expires.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    process::{Output, Stdio},
    time::{Duration, Instant},
};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::{fs, process::Command};

use crate::{
    error::{Result, TubescriptError},
    source::TranscriptSource,
    types::{AvailableTranscript, Segment},
    video_id::VideoId,
    vtt::parse_vtt,
};

pub const DEFAULT_PROGRAM: &str = "yt-dlp";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const MAX_DIAGNOSTIC_CHARS: usize = 4_000;

#[derive(Debug, Clone)]
pub struct YtDlp {
    program: PathBuf,
    extra_args: Vec<String>,
    timeout: Duration,
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

#[derive(Debug, Default, Deserialize)]
struct VideoInfo {
    #[serde(default)]
    subtitles: Option<BTreeMap<String, Vec<SubtitleFormat>>>,
    #[serde(default)]
    automatic_captions: Option<BTreeMap<String, Vec<SubtitleFormat>>>,
}

#[derive(Debug, Deserialize)]
struct SubtitleFormat {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

fn display_name(code: &str, formats: &[SubtitleFormat]) -> String {
    formats
        .iter()
        .find_map(|f| f.name.clone())
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| code.to_string())
}

fn is_machine_translation(formats: &[SubtitleFormat]) -> bool {
    formats
        .iter()
        .filter_map(|f| f.url.as_deref())
        .any(|u| u.contains("tlang="))
}

impl VideoInfo {
    fn catalog(self) -> Vec<AvailableTranscript> {
        let mut out = Vec::new();

        for (code, formats) in self.subtitles.unwrap_or_default() {
            // Live chat replay is exposed as a "subtitle" track.
            if code == "live_chat" || formats.is_empty() {
                continue;
            }
            out.push(AvailableTranscript {
                language: display_name(&code, &formats),
                language_code: code,
                is_generated: false,
            });
        }

        for (code, formats) in self.automatic_captions.unwrap_or_default() {
            if formats.is_empty() || is_machine_translation(&formats) {
                continue;
            }
            out.push(AvailableTranscript {
                language: display_name(&code, &formats),
                language_code: code,
                is_generated: true,
            });
        }

        out
    }
}

/// Parse the catalog out of a `yt-dlp -J` document.
pub fn parse_catalog(json: &[u8]) -> Result<Vec<AvailableTranscript>> {
    let info: VideoInfo = serde_json::from_slice(json)?;
    Ok(info.catalog())
}

fn bounded(s: &str) -> String {
    let s = s.trim();
    match s.char_indices().nth(MAX_DIAGNOSTIC_CHARS) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

fn diagnostics(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        return bounded(&stderr);
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.trim().is_empty() {
        return bounded(&stdout);
    }
    format!("exited with {}", output.status)
}

/// The subtitle file for `language`, else any VTT file in `dir`.
async fn find_subtitle_file(dir: &Path, language: &str) -> Result<Option<PathBuf>> {
    let suffix = format!(".{language}.vtt");
    let mut candidates = Vec::new();

    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("vtt") {
            candidates.push(path);
        }
    }
    candidates.sort();

    let exact = candidates.iter().position(|p| {
        p.file_name()
            .map(|n| n.to_string_lossy().ends_with(&suffix))
            .unwrap_or(false)
    });
    Ok(match exact {
        Some(i) => Some(candidates.swap_remove(i)),
        None => candidates.into_iter().next(),
    })
}

impl YtDlp {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Arguments placed before the fixed argument set (cookies, proxy, ...).
    pub fn with_extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn name(&self) -> String {
        self.program.display().to_string()
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.extra_args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn run(&self, mut cmd: Command) -> Result<Output> {
        let started = Instant::now();
        let child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TubescriptError::ToolMissing {
                    program: self.name(),
                }
            } else {
                TubescriptError::IoError(e)
            }
        })?;

        // Dropping the pending future on timeout drops the child, which kills it.
        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => {
                let output = output?;
                tracing::debug!(
                    program = %self.name(),
                    status = %output.status,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "yt-dlp finished"
                );
                Ok(output)
            }
            Err(_) => {
                tracing::warn!(
                    program = %self.name(),
                    timeout_secs = self.timeout.as_secs_f64(),
                    "yt-dlp timed out, killed"
                );
                Err(TubescriptError::Timeout {
                    command: self.name(),
                    after: self.timeout,
                })
            }
        }
    }
}

#[async_trait]
impl TranscriptSource for YtDlp {
    async fn list(&self, video_id: &VideoId) -> Result<Vec<AvailableTranscript>> {
        let mut cmd = self.command();
        cmd.arg("-J")
            .arg("--skip-download")
            .arg("--no-warnings")
            .arg(video_id.watch_url());

        let output = self.run(cmd).await?;
        if !output.status.success() {
            return Err(TubescriptError::CommandFailed {
                command: self.name(),
                diagnostics: diagnostics(&output),
            });
        }

        parse_catalog(&output.stdout)
    }

    async fn fetch(&self, video_id: &VideoId, language_code: &str) -> Result<Vec<Segment>> {
        let tmpdir = tempfile::Builder::new().prefix("tubescript-").tempdir()?;
        let output_template = tmpdir.path().join("%(id)s.%(ext)s");

        let mut cmd = self.command();
        cmd.arg("--skip-download")
            .arg("--write-sub")
            .arg("--write-auto-sub")
            .arg("--sub-lang")
            .arg(language_code)
            .arg("--sub-format")
            .arg("vtt")
            .arg("-o")
            .arg(&output_template)
            .arg(video_id.watch_url());

        let output = self.run(cmd).await?;
        if !output.status.success() {
            return Err(TubescriptError::CommandFailed {
                command: self.name(),
                diagnostics: diagnostics(&output),
            });
        }

        let Some(path) = find_subtitle_file(tmpdir.path(), language_code).await? else {
            return Err(TubescriptError::NoSubtitleFile {
                video_id: video_id.to_string(),
                language: language_code.to_string(),
                diagnostics: diagnostics(&output),
            });
        };

        let vtt = fs::read_to_string(&path).await?;
        Ok(parse_vtt(&vtt))
    }
}
