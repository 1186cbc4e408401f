use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use rss_sift::bootstrap::{build_state, init_tracing, CommonArgs};
use rss_sift::jobs::start_scheduler;
use rss_sift::{create_app, ServerOptions};

/// Serve filtered feeds as RSS and fetch them on their cron schedules.
#[derive(Debug, Parser)]
#[command(name = "rss-sift", version)]
struct Cli {
    /// Host to run the web application
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Port to run the web application
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Serve only; do not run scheduled fetches
    #[arg(long)]
    no_scheduler: bool,

    /// Rate limit the admin POST routes per client IP
    #[arg(long, env = "RATE_LIMIT_ADMIN")]
    rate_limit_admin: bool,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing();

    let options = ServerOptions {
        rate_limit_admin: cli.rate_limit_admin,
        ..ServerOptions::default()
    };
    let state = build_state(&cli.common, options).await?;

    // keep the handle alive for the lifetime of the server
    let _scheduler = if cli.no_scheduler {
        tracing::info!("Scheduler disabled");
        None
    } else {
        Some(start_scheduler(state.clone()).await?)
    };

    let app = create_app(state);
    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Server running on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
