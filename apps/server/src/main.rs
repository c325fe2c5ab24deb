use anyhow::{Context, Result};
use clap::Parser;
use tubescript_server::{ServerConfig, start, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();
    telemetry::init_logging(config.log_format);

    tracing::info!(
        languages = %config.languages,
        yt_dlp = %config.yt_dlp.display(),
        timeout_secs = config.timeout_secs,
        cache = config.cache,
        "starting"
    );

    let handle = start(config.bind, config.app_state())
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("shutting down");
    handle.shutdown().await;

    Ok(())
}
