//! Startup wiring shared by the server and worker binaries.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tracing_subscriber::EnvFilter;

use crate::config::SiftConfig;
use crate::relevance::{self, ReplicateFilter, ReplicateSettings};
use crate::{db, fetcher, AppState, ServerOptions, DEFAULT_RSS_ITEM_LIMIT};

#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Feed configuration file
    #[arg(long, env = "SIFT_CONFIG", default_value = "config.json")]
    pub config: PathBuf,

    #[arg(long, env = "DATABASE_URL", default_value = db::DEFAULT_DATABASE_URL)]
    pub database_url: String,

    /// Token for the inference API
    #[arg(long, env = "REPLICATE_API_TOKEN", hide_env_values = true)]
    pub replicate_api_token: String,

    #[arg(long, env = "REPLICATE_MODEL", default_value = relevance::DEFAULT_MODEL)]
    pub replicate_model: String,

    #[arg(long, env = "REPLICATE_API_BASE", default_value = relevance::DEFAULT_API_BASE)]
    pub replicate_api_base: String,

    /// Upper bound for one relevance check, polling included
    #[arg(long, env = "RELEVANCE_TIMEOUT_SECS", default_value_t = 60)]
    pub relevance_timeout_secs: u64,

    #[arg(long, env = "FETCH_TIMEOUT_SECS", default_value_t = 30)]
    pub fetch_timeout_secs: u64,

    #[arg(long, env = "RSS_ITEM_LIMIT", default_value_t = DEFAULT_RSS_ITEM_LIMIT)]
    pub rss_item_limit: u64,
}

/// Install the global fmt subscriber; `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,hyper=warn,reqwest=warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub async fn build_state(args: &CommonArgs, options: ServerOptions) -> Result<AppState> {
    let config = SiftConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    tracing::info!(
        "Loaded {} feeds from {} (timezone {})",
        config.feeds.len(),
        args.config.display(),
        config.timezone
    );

    let db = db::connect(&args.database_url)
        .await
        .context("failed to connect to database")?;

    let http_client = fetcher::build_client(Duration::from_secs(args.fetch_timeout_secs))?;

    let settings = ReplicateSettings {
        api_base: args.replicate_api_base.clone(),
        model: args.replicate_model.clone(),
        api_token: args.replicate_api_token.clone(),
        timeout: Duration::from_secs(args.relevance_timeout_secs),
    };
    // the filter has its own client: its timeout is enforced per call instead
    let filter = ReplicateFilter::new(reqwest::Client::new(), settings);

    Ok(AppState {
        db,
        config: Arc::new(config),
        http_client,
        filter: Arc::new(filter),
        options: ServerOptions {
            rss_item_limit: args.rss_item_limit,
            ..options
        },
    })
}
