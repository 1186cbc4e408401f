use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::{cursors, entries};
use crate::error::AppError;
use crate::rss_feed::render_rss;
use crate::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct FeedStatus {
    /// Feed name as configured
    pub name: String,
    /// Page the feed is scraped from
    pub url_to_fetch: String,
    /// Cron expression driving scheduled fetches
    pub cron: String,
    /// Path of the rendered RSS document
    pub rss_path: String,
    /// RFC 3339 time of the last successful fetch in the configured timezone, if any
    pub last_fetched: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FeedIndex {
    pub timezone: String,
    pub feeds: Vec<FeedStatus>,
}

/// List configured feeds and when each was last fetched
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Configured feeds", body = FeedIndex)
    )
)]
pub async fn index(State(state): State<AppState>) -> Result<Json<FeedIndex>, AppError> {
    let fetched = cursors::list_cursors(&state.db).await?;

    let feeds = state
        .config
        .feeds
        .iter()
        .map(|feed| FeedStatus {
            name: feed.name.clone(),
            url_to_fetch: feed.url_to_fetch.clone(),
            cron: feed.cron.clone(),
            rss_path: feed.rss_path(),
            last_fetched: fetched
                .iter()
                .find(|c| c.feed_name == feed.name)
                .map(|c| c.last_fetched.with_timezone(&state.config.timezone).to_rfc3339()),
        })
        .collect();

    Ok(Json(FeedIndex {
        timezone: state.config.timezone.to_string(),
        feeds,
    }))
}

/// Render the stored entries of a feed as RSS 2.0, newest first
#[utoipa::path(
    get,
    path = "/{feed_name}/rss.xml",
    params(
        ("feed_name" = String, Path, description = "Configured feed name")
    ),
    responses(
        (status = 200, description = "RSS document", content_type = "application/rss+xml", body = String),
        (status = 404, description = "Feed is not configured")
    )
)]
pub async fn rss_feed(
    State(state): State<AppState>,
    Path(feed_name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let feed = state
        .config
        .feed(&feed_name)
        .ok_or_else(|| AppError::FeedNotFound(feed_name.clone()))?;

    let stored =
        entries::list_by_feed(&state.db, &feed.name, state.options.rss_item_limit).await?;
    let xml = render_rss(feed, &stored, state.config.timezone).map_err(|e| {
        tracing::error!("Error generating RSS feed for {}: {}", feed_name, e);
        e
    })?;

    Ok(([(header::CONTENT_TYPE, "application/rss+xml; charset=utf-8")], xml))
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = String)
    )
)]
pub async fn health_check() -> impl IntoResponse {
    "Service is healthy"
}
