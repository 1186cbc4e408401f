mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use rss_sift::relevance::{RelevanceFilter, ReplicateFilter, ReplicateSettings};
use serde_json::{json, Value};

fn filter_for(base: &str, timeout: Duration) -> ReplicateFilter {
    let settings = ReplicateSettings {
        api_base: base.to_string(),
        timeout,
        ..ReplicateSettings::new("test-token")
    };
    ReplicateFilter::new(reqwest::Client::new(), settings)
}

const PREDICT_PATH: &str = "/models/meta/meta-llama-3-70b-instruct/predictions";

async fn answering(output: Value) -> String {
    let router = Router::new().route(
        PREDICT_PATH,
        post(move |headers: HeaderMap, Json(body): Json<Value>| {
            let output = output.clone();
            async move {
                assert_eq!(headers["authorization"], "Bearer test-token");
                assert!(body["input"]["prompt"]
                    .as_str()
                    .unwrap()
                    .contains("This is the book title"));
                Json(json!({ "id": "p1", "status": "succeeded", "output": output }))
            }
        }),
    );
    common::serve(router).await
}

#[tokio::test]
async fn yes_answer_is_relevant() {
    common::setup();
    let base = answering(json!(["Y", "es"])).await;
    let filter = filter_for(&base, Duration::from_secs(5));

    assert!(filter.is_relevant("Building Microservices").await);
}

#[tokio::test]
async fn no_answer_is_not_relevant() {
    common::setup();
    let base = answering(json!(["No"])).await;
    let filter = filter_for(&base, Duration::from_secs(5));

    assert!(!filter.is_relevant("Pirate vs. Pirate").await);
}

#[tokio::test]
async fn unparseable_answer_is_not_relevant() {
    common::setup();
    let base = answering(json!(["I cannot say."])).await;
    let filter = filter_for(&base, Duration::from_secs(5));

    assert!(!filter.is_relevant("Ambiguous").await);
}

#[tokio::test]
async fn unreachable_endpoint_is_not_relevant() {
    common::setup();
    // bind then drop so nothing is listening on the port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let filter = filter_for(&format!("http://{}", addr), Duration::from_secs(5));
    assert!(!filter.is_relevant("Anything").await);
}

#[tokio::test]
async fn server_error_is_not_relevant() {
    common::setup();
    let router = Router::new().route(
        PREDICT_PATH,
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let base = common::serve(router).await;

    assert!(!filter_for(&base, Duration::from_secs(5)).is_relevant("Anything").await);
}

#[tokio::test]
async fn failed_prediction_is_not_relevant() {
    common::setup();
    let router = Router::new().route(
        PREDICT_PATH,
        post(|| async {
            Json(json!({ "status": "failed", "output": null, "error": "model crashed" }))
        }),
    );
    let base = common::serve(router).await;

    assert!(!filter_for(&base, Duration::from_secs(5)).is_relevant("Anything").await);
}

#[tokio::test]
async fn slow_endpoint_times_out_as_not_relevant() {
    common::setup();
    let router = Router::new().route(
        PREDICT_PATH,
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({ "status": "succeeded", "output": ["yes"] }))
        }),
    );
    let base = common::serve(router).await;
    let filter = filter_for(&base, Duration::from_millis(200));

    let started = std::time::Instant::now();
    assert!(!filter.is_relevant("Anything").await);
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn running_prediction_is_polled_until_done() {
    common::setup();
    let polls = Arc::new(AtomicUsize::new(0));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let poll_url = format!("{}/predictions/p1", base);

    let router = Router::new()
        .route(
            PREDICT_PATH,
            post(move || {
                let poll_url = poll_url.clone();
                async move {
                    Json(json!({
                        "status": "processing",
                        "output": null,
                        "urls": { "get": poll_url }
                    }))
                }
            }),
        )
        .route(
            "/predictions/p1",
            get(|State(polls): State<Arc<AtomicUsize>>| async move {
                if polls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Json(json!({ "status": "processing", "output": ["Ye"] }))
                } else {
                    Json(json!({ "status": "succeeded", "output": ["Ye", "s"] }))
                }
            }),
        )
        .with_state(polls.clone());
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let filter = filter_for(&base, Duration::from_secs(10));
    assert!(filter.is_relevant("Kubernetes in Action").await);
    assert_eq!(polls.load(Ordering::SeqCst), 3);
}
