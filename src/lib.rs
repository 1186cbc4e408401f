pub mod bootstrap;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod jobs;
pub mod relevance;
pub mod routes;
pub mod rss_feed;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use sea_orm::DatabaseConnection;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::SiftConfig;
use crate::relevance::SharedFilter;

pub const DEFAULT_RSS_ITEM_LIMIT: u64 = 100;

#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Most entries a single RSS document carries
    pub rss_item_limit: u64,
    /// Per-IP rate limit on the POST admin routes; needs connect info on the listener
    pub rate_limit_admin: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            rss_item_limit: DEFAULT_RSS_ITEM_LIMIT,
            rate_limit_admin: false,
        }
    }
}

/// Everything a feed run or a request handler needs. Cloning is cheap; the
/// database handle is a pool and each query checks out its own connection.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<SiftConfig>,
    pub http_client: reqwest::Client,
    pub filter: SharedFilter,
    pub options: ServerOptions,
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "rss-sift",
        version = "0.1.0",
        description = "Scraped article listings, filtered for relevance and served as RSS"
    ),
    paths(
        routes::feeds::index,
        routes::feeds::rss_feed,
        routes::feeds::health_check,
        routes::admin::fetch_all_feeds,
        routes::admin::fetch_feed,
        routes::admin::clean_feed,
    ),
    components(schemas(
        routes::feeds::FeedIndex,
        routes::feeds::FeedStatus,
        routes::admin::FeedNameForm,
        jobs::RunAllSummary,
        jobs::sift_feed::FeedRunOutcome,
        jobs::FeedRunSummary,
    ))
)]
struct ApiDoc;

fn admin_routes(options: &ServerOptions) -> Router<AppState> {
    let routes = Router::new()
        .route("/fetch_all_feeds", post(routes::fetch_all_feeds))
        .route("/fetch_feed", post(routes::fetch_feed))
        .route("/clean", post(routes::clean_feed));

    if !options.rate_limit_admin {
        return routes;
    }

    match GovernorConfigBuilder::default()
        .key_extractor(SmartIpKeyExtractor)
        .period(std::time::Duration::from_secs(12))
        .burst_size(5)
        .finish()
    {
        Some(config) => routes.layer(GovernorLayer {
            config: Arc::new(config),
        }),
        None => {
            tracing::warn!("Invalid rate limit configuration; admin routes are not rate limited");
            routes
        }
    }
}

/// Create the application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let api_doc = ApiDoc::openapi();

    let public_routes = Router::new()
        .route("/", get(routes::index))
        .route("/health", get(routes::health_check))
        .route("/{feed_name}/rss.xml", get(routes::rss_feed));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes(&state.options))
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", api_doc))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
