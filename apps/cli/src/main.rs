use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;
use tubescript_core::{
    DEFAULT_PREFERENCES, FallbackChain, Resolved, TranscriptCache, TranscriptSource,
    TubescriptError, VideoId, YtDlp, format_available, format_transcript_with_timestamps,
    ytdlp::DEFAULT_PROGRAM,
};

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

#[derive(Parser)]
#[command(name = "tubescript")]
#[command(about = "Fetch the transcript of a YouTube video as plain text")]
struct Cli {
    /// Video URL or 11 character video id
    video: String,

    /// Language preference order, comma separated. `*` means any available.
    #[arg(short, long, default_value = DEFAULT_PREFERENCES)]
    lang: FallbackChain,

    /// Prefix each caption with its start time
    #[arg(short, long, conflicts_with = "json")]
    timestamps: bool,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,

    /// Only list the transcripts the video offers
    #[arg(long)]
    list: bool,

    /// Ignore cached transcripts
    #[arg(short, long)]
    force: bool,

    /// Do not read or write the transcript cache
    #[arg(long)]
    no_cache: bool,

    /// Time limit for each yt-dlp call, in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// yt-dlp executable
    #[arg(long = "yt-dlp", default_value = DEFAULT_PROGRAM)]
    yt_dlp: String,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let spinner_style = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(spinner_style);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn list(ytdlp: &YtDlp, video_id: &VideoId, json: bool) -> Result<()> {
    let spinner = create_spinner("Listing transcripts...");
    let available = ytdlp.list(video_id).await;
    spinner.finish_and_clear();
    let available = available.context("failed to list transcripts")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&available)?);
    } else if available.is_empty() {
        eprintln!("{} No transcripts available", style("!").yellow().bold());
    } else {
        println!("{}", format_available(&available));
    }
    Ok(())
}

async fn resolve(
    cli: &Cli,
    ytdlp: &YtDlp,
    cache: Option<&TranscriptCache>,
    video_id: &VideoId,
) -> Result<Resolved> {
    if !cli.force
        && let Some(cache) = cache
        && let Some(hit) = cache.load(video_id, &cli.lang).await
    {
        eprintln!(
            "{} Transcript: {} {}",
            style("✓").green().bold(),
            style(&hit.transcript.language).yellow(),
            style("(cached)").dim()
        );
        return Ok(hit);
    }

    let step_start = Instant::now();
    let spinner = create_spinner(&format!("Fetching transcript ({})...", cli.lang));
    let result = cli.lang.resolve(ytdlp, video_id).await;

    let resolved = match result {
        Ok(resolved) => resolved,
        Err(TubescriptError::NotFound {
            available, detail, ..
        }) => {
            spinner.finish_and_clear();
            eprintln!(
                "{} No transcript found for {}",
                style("✗").red().bold(),
                video_id
            );
            if let Some(detail) = detail {
                eprintln!("  {}", style(detail).dim());
            }
            if !available.is_empty() {
                eprintln!("\nAvailable transcripts:\n{}", format_available(&available));
            }
            anyhow::bail!("no transcript matched {}", cli.lang);
        }
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e).context("failed to fetch transcript");
        }
    };

    spinner.finish_with_message(format!(
        "{} Transcript: {}{}, {} segments {}",
        style("✓").green().bold(),
        style(&resolved.transcript.language).yellow(),
        if resolved.transcript.is_generated {
            " (auto)"
        } else {
            ""
        },
        resolved.transcript.segment_count(),
        style(format!("[{}]", format_duration(step_start.elapsed()))).dim()
    ));

    if let Some(cache) = cache
        && let Err(e) = cache.store(&cli.lang, &resolved).await
    {
        tracing::warn!(error = %e, "failed to write transcript cache");
    }

    Ok(resolved)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let video_id = VideoId::parse(&cli.video)?;
    let ytdlp = YtDlp::new(&cli.yt_dlp).with_timeout(Duration::from_secs(cli.timeout_secs.max(1)));

    if cli.list {
        return list(&ytdlp, &video_id, cli.json).await;
    }

    let cache = (!cli.no_cache).then(TranscriptCache::default);
    let resolved = resolve(&cli, &ytdlp, cache.as_ref(), &video_id).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
    } else if cli.timestamps {
        println!("{}", format_transcript_with_timestamps(&resolved.transcript));
    } else {
        println!("{}", resolved.transcript.text());
    }

    Ok(())
}
