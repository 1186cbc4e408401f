//! One fetch → extract → filter → store cycle for a feed.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::config::FeedConfig;
use crate::db::{cursors, entries};
use crate::entities::feed_entry::entry_hash;
use crate::error::AppError;
use crate::extractor::{self, Article};
use crate::fetcher;
use crate::AppState;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FeedRunSummary {
    /// Feed that was processed
    pub feed: String,
    /// Articles found on the page
    pub extracted: usize,
    /// Articles already stored from an earlier run
    pub duplicates: usize,
    /// Articles dropped for missing extra text or a missing required keyword
    pub gated: usize,
    /// Articles the relevance filter turned down
    pub rejected: usize,
    /// New entries written to the store
    pub inserted: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FeedRunOutcome {
    pub feed: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<FeedRunSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RunAllSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub feeds: Vec<FeedRunOutcome>,
}

impl RunAllSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Stored timestamps are UTC so their text form sorts chronologically;
/// readers convert to the configured timezone.
fn now_utc() -> DateTime<FixedOffset> {
    Utc::now().fixed_offset()
}

fn passes_info_gate(feed: &FeedConfig, article: &Article) -> bool {
    match &article.additional_info {
        Some(info) => feed.required_keywords.iter().all(|k| info.contains(k.as_str())),
        None => !feed.require_info && feed.required_keywords.is_empty(),
    }
}

/// Run the full cycle for `feed`. A failed fetch aborts the cycle and leaves
/// the feed cursor untouched.
#[tracing::instrument(skip(state, feed), fields(feed = %feed.name))]
pub async fn run_feed(state: &AppState, feed: &FeedConfig) -> Result<FeedRunSummary, AppError> {
    info!("Fetching feed: {} from {}", feed.name, feed.url_to_fetch);

    let html = match fetcher::fetch_html(&state.http_client, &feed.url_to_fetch).await {
        Ok(html) => html,
        Err(e) => {
            error!("Failed to fetch feed {}: {}", feed.name, e);
            return Err(e);
        }
    };

    let articles = extractor::extract_articles(&html, &feed.url_prefix);
    let mut summary = FeedRunSummary {
        feed: feed.name.clone(),
        extracted: articles.len(),
        ..Default::default()
    };

    for article in articles {
        let hash = entry_hash(&article.title, &article.link);
        if entries::exists(&state.db, &hash).await? {
            summary.duplicates += 1;
            continue;
        }

        if !passes_info_gate(feed, &article) {
            summary.gated += 1;
            continue;
        }

        let accepted_by_filter = if feed.skip_filter {
            false
        } else {
            info!("Processing: {}", article.title);
            if !state.filter.is_relevant(&article.title).await {
                info!("Title not selected by AI: {}", article.title);
                summary.rejected += 1;
                continue;
            }
            true
        };

        let inserted = entries::insert_if_absent(
            &state.db,
            entries::NewEntry {
                feed_name: feed.name.clone(),
                title: article.title,
                link: article.link,
                additional_info: article.additional_info,
                accepted_by_filter,
                created: now_utc(),
            },
        )
        .await?;

        if inserted {
            summary.inserted += 1;
        } else {
            summary.duplicates += 1;
        }
    }

    cursors::set_cursor(&state.db, &feed.name, now_utc()).await?;

    info!(
        "Completed fetching feed: {} ({} extracted, {} new, {} duplicate, {} gated, {} rejected)",
        feed.name,
        summary.extracted,
        summary.inserted,
        summary.duplicates,
        summary.gated,
        summary.rejected
    );
    Ok(summary)
}

/// Run every configured feed in order. One feed failing does not stop the rest.
pub async fn run_all(state: &AppState) -> RunAllSummary {
    let mut outcomes = Vec::with_capacity(state.config.feeds.len());

    for feed in &state.config.feeds {
        let outcome = match run_feed(state, feed).await {
            Ok(summary) => FeedRunOutcome {
                feed: feed.name.clone(),
                ok: true,
                summary: Some(summary),
                error: None,
            },
            Err(e) => FeedRunOutcome {
                feed: feed.name.clone(),
                ok: false,
                summary: None,
                error: Some(e.to_string()),
            },
        };
        outcomes.push(outcome);
    }

    let succeeded = outcomes.iter().filter(|o| o.ok).count();
    RunAllSummary {
        succeeded,
        failed: outcomes.len() - succeeded,
        feeds: outcomes,
    }
}
