use anyhow::{bail, Result};
use clap::Parser;
use tracing::{error, info};

use rss_sift::bootstrap::{build_state, init_tracing, CommonArgs};
use rss_sift::jobs::{run_all, run_feed, start_scheduler};
use rss_sift::ServerOptions;

/// Run feed fetches without the HTTP server.
#[derive(Debug, Parser)]
#[command(name = "rss-sift-worker", version)]
struct Cli {
    /// Run once and exit instead of following the cron schedules
    #[arg(long)]
    once: bool,

    /// Restrict a one-shot run to this feed
    #[arg(long, requires = "once")]
    feed: Option<String>,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env (if present) so the API token from file is visible
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing();

    let state = build_state(&cli.common, ServerOptions::default()).await?;

    if cli.once {
        match cli.feed.as_deref() {
            Some(name) => {
                let Some(feed) = state.config.feed(name) else {
                    bail!("feed not found: {}", name);
                };
                let summary = run_feed(&state, feed).await?;
                info!("{}", serde_json::to_string(&summary)?);
            }
            None => {
                let summary = run_all(&state).await;
                info!("{}", serde_json::to_string(&summary)?);
                if !summary.all_succeeded() {
                    bail!("{} of {} feeds failed", summary.failed, summary.feeds.len());
                }
            }
        }
        return Ok(());
    }

    let _scheduler = start_scheduler(state).await?;
    info!("Worker running scheduled fetches; press Ctrl-C to stop");
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(?e, "failed to listen for shutdown signal");
    }
    info!("Worker shutting down");
    Ok(())
}
