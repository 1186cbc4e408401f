#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use async_trait::async_trait;
use axum::Router;
use rss_sift::config::SiftConfig;
use rss_sift::relevance::RelevanceFilter;
use rss_sift::{AppState, ServerOptions};
use sea_orm::DatabaseConnection;

// For initializing tracing once
static INIT: Once = Once::new();

pub fn setup() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

pub async fn memory_db() -> DatabaseConnection {
    rss_sift::db::connect("sqlite::memory:")
        .await
        .expect("in-memory database with migrations")
}

/// Accepts exactly the titles it was built with and counts every call.
pub struct StubFilter {
    accepted: HashSet<String>,
    calls: AtomicUsize,
}

impl StubFilter {
    pub fn accepting(titles: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            accepted: titles.iter().map(|t| t.to_string()).collect(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RelevanceFilter for StubFilter {
    async fn is_relevant(&self, title: &str) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.accepted.contains(title)
    }
}

pub fn state_with(db: DatabaseConnection, config_json: &str, filter: Arc<StubFilter>) -> AppState {
    AppState {
        db,
        config: Arc::new(SiftConfig::from_json(config_json).expect("valid test config")),
        http_client: reqwest::Client::new(),
        filter,
        options: ServerOptions::default(),
    }
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A listing page in the layout the extractor understands.
pub fn listing_html(items: &[(&str, &str, Option<&str>)]) -> String {
    let rows: String = items
        .iter()
        .map(|(title, href, info)| {
            let info_div = info
                .map(|i| format!(r#"<div class="text-center"><b>Info:</b> {}</div>"#, i))
                .unwrap_or_default();
            format!(
                r#"<div class="row">
                     <div class="article">
                       <h1><a class="title-link" href="{href}">{title}</a></h1>
                       <div class="text-center">no bold here</div>
                       {info_div}
                     </div>
                   </div>"#
            )
        })
        .collect();
    format!("<html><body><div class=\"container\">{}</div></body></html>", rows)
}

pub fn single_feed_config(name: &str, url: &str, extra: &str) -> String {
    format!(
        r#"{{
            "timezone": "Europe/Berlin",
            "feeds": [{{
                "name": "{name}",
                "url_to_fetch": "{url}",
                "url_prefix": "https://books.example",
                "cron": "0 */6 * * *"{extra}
            }}]
        }}"#
    )
}
