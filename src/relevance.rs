//! Title relevance checks backed by a hosted LLM.
//!
//! The filter fails closed: transport errors, timeouts, failed predictions
//! and answers that are neither "yes" nor "no" all count as "not relevant".

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::json;

pub const DEFAULT_API_BASE: &str = "https://api.replicate.com/v1";
pub const DEFAULT_MODEL: &str = "meta/meta-llama-3-70b-instruct";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

static VERDICT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(yes|no)\b").expect("verdict regex is valid"));

const SYSTEM_PROMPT: &str = "You are an expert and helpful software developer and data expert";

const PROMPT_TEMPLATE: &str = r#"Your task is to determine if a book title pertains to one or more of the following topics:
- software development
- machine learning
- artificial intelligence (AI)
- DevOps
- programming languages
- front-end development
- software development best practices
- large language models (such as chatgpt, llama)
- data science
- networking
- software architecture
- technical leadership

You should only respond with "yes" or "no". The title must strictly relate to the specified topics and may cover multiple topics listed.
Do not include any additional text, explanations, or comments.

This is the book title: "{title}"
"#;

#[async_trait]
pub trait RelevanceFilter: Send + Sync {
    /// Never fails; anything short of a clear "yes" is `false`.
    async fn is_relevant(&self, title: &str) -> bool;
}

pub type SharedFilter = Arc<dyn RelevanceFilter>;

pub fn build_prompt(title: &str) -> String {
    PROMPT_TEMPLATE.replace("{title}", title)
}

/// First standalone "yes" or "no" in the model output, if any.
pub fn parse_verdict(output: &str) -> Option<bool> {
    VERDICT_RE
        .find(output)
        .map(|m| m.as_str().eq_ignore_ascii_case("yes"))
}

#[derive(Debug, Clone)]
pub struct ReplicateSettings {
    pub api_base: String,
    pub model: String,
    pub api_token: String,
    pub timeout: Duration,
}

impl ReplicateSettings {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_token: api_token.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Prediction {
    status: String,
    #[serde(default)]
    output: Option<PredictionOutput>,
    #[serde(default)]
    error: Option<serde_json::Value>,
    #[serde(default)]
    urls: Option<PredictionUrls>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PredictionOutput {
    Tokens(Vec<String>),
    Text(String),
}

impl PredictionOutput {
    fn joined(&self) -> String {
        match self {
            PredictionOutput::Tokens(tokens) => tokens.concat(),
            PredictionOutput::Text(text) => text.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PredictionUrls {
    get: Option<String>,
}

impl Prediction {
    fn is_terminal(&self) -> bool {
        matches!(self.status.as_str(), "succeeded" | "failed" | "canceled")
    }
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Relevance filter calling the Replicate predictions API.
pub struct ReplicateFilter {
    client: Client,
    settings: ReplicateSettings,
}

impl ReplicateFilter {
    pub fn new(client: Client, settings: ReplicateSettings) -> Self {
        Self { client, settings }
    }

    async fn predict(&self, title: &str) -> Result<String, BoxError> {
        let url = format!(
            "{}/models/{}/predictions",
            self.settings.api_base.trim_end_matches('/'),
            self.settings.model
        );
        let body = json!({
            "input": {
                "prompt": build_prompt(title),
                "system_prompt": SYSTEM_PROMPT,
            }
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.settings.api_token)
            .header("Prefer", "wait")
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            tracing::error!(
                "Replicate API error: Status {}, URL: {}, Body: {}",
                status,
                url,
                error_text
            );
            return Err(format!("Replicate API request failed with status: {}", status).into());
        }

        let mut prediction: Prediction = response.json().await?;
        if !prediction.is_terminal() {
            let poll_url = prediction
                .urls
                .as_ref()
                .and_then(|u| u.get.clone())
                .ok_or("prediction is still running but has no poll url")?;
            prediction = self.poll(&poll_url).await?;
        }

        match prediction.status.as_str() {
            "succeeded" => Ok(prediction
                .output
                .map(|o| o.joined())
                .unwrap_or_default()),
            other => Err(format!("prediction {}: {:?}", other, prediction.error).into()),
        }
    }

    /// Re-read a running prediction until it reaches a terminal state.
    async fn poll(&self, poll_url: &str) -> Result<Prediction, BoxError> {
        let policy = ExponentialBackoff {
            initial_interval: Duration::from_millis(250),
            max_interval: Duration::from_secs(5),
            max_elapsed_time: Some(self.settings.timeout),
            ..ExponentialBackoff::default()
        };

        retry(policy, move || async move {
            let response = self
                .client
                .get(poll_url)
                .bearer_auth(&self.settings.api_token)
                .send()
                .await
                .map_err(|e| backoff::Error::permanent(BoxError::from(e)))?;
            let prediction: Prediction = response
                .error_for_status()
                .map_err(|e| backoff::Error::permanent(BoxError::from(e)))?
                .json()
                .await
                .map_err(|e| backoff::Error::permanent(BoxError::from(e)))?;

            if prediction.is_terminal() {
                Ok(prediction)
            } else {
                tracing::debug!("Prediction still {}, polling again", prediction.status);
                Err(backoff::Error::transient(BoxError::from(format!(
                    "prediction still {}",
                    prediction.status
                ))))
            }
        })
        .await
    }
}

#[async_trait]
impl RelevanceFilter for ReplicateFilter {
    #[tracing::instrument(skip(self))]
    async fn is_relevant(&self, title: &str) -> bool {
        let output = match tokio::time::timeout(self.settings.timeout, self.predict(title)).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                tracing::error!("Error while checking title with AI: {}", e);
                return false;
            }
            Err(_) => {
                tracing::error!("AI check timed out after {:?}", self.settings.timeout);
                return false;
            }
        };

        tracing::debug!("Full AI response: {:?}", output);
        match parse_verdict(&output) {
            Some(verdict) => {
                tracing::info!("AI verdict: {}", if verdict { "relevant" } else { "not relevant" });
                verdict
            }
            None => {
                tracing::warn!("Unparseable AI response: {:?}", output);
                false
            }
        }
    }
}
