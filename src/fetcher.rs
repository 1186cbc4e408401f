use std::time::Duration;

use reqwest::Client;

use crate::error::AppError;

pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("rss-sift/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// GET `url` and return the body. Any transport error or non-2xx status is a
/// `FetchFailed`; there is no retry.
#[tracing::instrument(skip(client))]
pub async fn fetch_html(client: &Client, url: &str) -> Result<String, AppError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::FetchFailed(format!("{}: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::FetchFailed(format!("{}: status {}", url, status)));
    }

    response
        .text()
        .await
        .map_err(|e| AppError::FetchFailed(format!("{}: failed to read body: {}", url, e)))
}
