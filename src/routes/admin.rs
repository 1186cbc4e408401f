use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Form, Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::db::entries;
use crate::error::AppError;
use crate::jobs::{run_all, run_feed, RunAllSummary};
use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct FeedNameForm {
    /// Name of a configured feed
    pub feed_name: Option<String>,
}

impl FeedNameForm {
    fn require(self) -> Result<String, AppError> {
        self.feed_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::MissingField("feed_name".into()))
    }
}

/// Fetch every configured feed now
#[utoipa::path(
    post,
    path = "/fetch_all_feeds",
    responses(
        (status = 200, description = "All feeds fetched successfully", body = RunAllSummary),
        (status = 500, description = "At least one feed failed", body = RunAllSummary)
    )
)]
pub async fn fetch_all_feeds(State(state): State<AppState>) -> impl IntoResponse {
    let summary = run_all(&state).await;
    let status = if summary.all_succeeded() {
        StatusCode::OK
    } else {
        tracing::error!("{} of {} feeds failed", summary.failed, summary.feeds.len());
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(summary))
}

/// Fetch one feed now, then go back to the index
#[utoipa::path(
    post,
    path = "/fetch_feed",
    request_body(content = FeedNameForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Feed fetched; redirect to index"),
        (status = 400, description = "feed_name missing"),
        (status = 404, description = "Feed is not configured"),
        (status = 502, description = "Source page could not be fetched")
    )
)]
pub async fn fetch_feed(
    State(state): State<AppState>,
    Form(form): Form<FeedNameForm>,
) -> Result<Redirect, AppError> {
    let feed_name = form.require()?;
    let feed = state
        .config
        .feed(&feed_name)
        .ok_or_else(|| AppError::FeedNotFound(feed_name.clone()))?;

    run_feed(&state, feed).await?;
    Ok(Redirect::to("/"))
}

/// Delete every stored entry of a feed
#[utoipa::path(
    post,
    path = "/clean",
    request_body(content = FeedNameForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Entries deleted; redirect to index"),
        (status = 400, description = "feed_name missing")
    )
)]
pub async fn clean_feed(
    State(state): State<AppState>,
    Form(form): Form<FeedNameForm>,
) -> Result<Redirect, AppError> {
    let feed_name = form.require()?;
    let removed = entries::delete_by_feed(&state.db, &feed_name).await?;
    tracing::info!("Cleaned feed {}: {} entries removed", feed_name, removed);
    Ok(Redirect::to("/"))
}
