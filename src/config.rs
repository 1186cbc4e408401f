//! Static feed configuration loaded from a JSON file at startup.
//!
//! ```json
//! {
//!   "timezone": "Europe/Berlin",
//!   "feeds": [
//!     { "name": "books", "url_to_fetch": "https://…", "url_prefix": "https://…", "cron": "0 */6 * * *" }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use chrono_tz::Tz;
use serde::Deserialize;
use url::Url;

use crate::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub name: String,
    pub url_to_fetch: String,
    /// Prepended to relative article links.
    #[serde(default)]
    pub url_prefix: String,
    pub cron: String,
    /// Every keyword must appear in an article's extra text for it to be considered.
    #[serde(default)]
    pub required_keywords: Vec<String>,
    /// Store every new article without asking the relevance filter.
    #[serde(default)]
    pub skip_filter: bool,
    /// Drop articles that have no extra text.
    #[serde(default = "default_require_info")]
    pub require_info: bool,
}

fn default_require_info() -> bool {
    true
}

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Crontab weekday number (0 and 7 are Sunday) as a name.
fn weekday_name(value: &str) -> Option<&'static str> {
    match value.parse::<usize>() {
        Ok(n) if n <= 7 => Some(WEEKDAYS[n % 7]),
        _ => None,
    }
}

/// Rewrite a crontab day-of-week field with names. The scheduler numbers
/// days from 1 = Sunday, crontab from 0 = Sunday, while names agree.
fn crontab_weekdays(field: &str) -> String {
    field
        .split(',')
        .map(|item| {
            let (range, step) = match item.split_once('/') {
                Some((range, step)) => (range, Some(step)),
                None => (item, None),
            };
            let translated = match range.split_once('-') {
                Some((start, end)) => {
                    let start = weekday_name(start).unwrap_or(start);
                    match end.parse::<usize>() {
                        // ranges do not wrap past Saturday
                        Ok(7) if start == "Sun" => "Sun-Sat".to_string(),
                        Ok(7) if step.is_none() => return format!("{}-Sat,Sun", start),
                        Ok(7) => format!("{}-Sat", start),
                        _ => format!("{}-{}", start, weekday_name(end).unwrap_or(end)),
                    }
                }
                None => weekday_name(range).unwrap_or(range).to_string(),
            };
            match step {
                Some(step) => format!("{}/{}", translated, step),
                None => translated,
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

impl FeedConfig {
    /// Cron expression in the seconds-first form the scheduler expects.
    /// Classic five-field crontab lines fire at second zero and get their
    /// weekday numbers spelled out.
    pub fn schedule(&self) -> String {
        let fields: Vec<&str> = self.cron.split_whitespace().collect();
        if fields.len() == 5 {
            format!(
                "0 {} {} {} {} {}",
                fields[0],
                fields[1],
                fields[2],
                fields[3],
                crontab_weekdays(fields[4])
            )
        } else {
            fields.join(" ")
        }
    }

    pub fn rss_path(&self) -> String {
        format!("/{}/rss.xml", self.name)
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default = "default_timezone")]
    timezone: String,
    #[serde(default)]
    feeds: Vec<FeedConfig>,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

#[derive(Debug, Clone)]
pub struct SiftConfig {
    pub timezone: Tz,
    pub feeds: Vec<FeedConfig>,
}

impl SiftConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            AppError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, AppError> {
        let raw: RawConfig = serde_json::from_str(text)?;

        let timezone: Tz = raw
            .timezone
            .parse()
            .map_err(|_| AppError::InvalidConfig(format!("unknown timezone: {}", raw.timezone)))?;

        let mut seen = HashSet::new();
        for feed in &raw.feeds {
            validate_feed(feed)?;
            if !seen.insert(feed.name.as_str()) {
                return Err(AppError::InvalidConfig(format!(
                    "duplicate feed name: {}",
                    feed.name
                )));
            }
        }

        Ok(SiftConfig {
            timezone,
            feeds: raw.feeds,
        })
    }

    pub fn feed(&self, name: &str) -> Option<&FeedConfig> {
        self.feeds.iter().find(|f| f.name == name)
    }
}

fn validate_feed(feed: &FeedConfig) -> Result<(), AppError> {
    if feed.name.trim().is_empty() {
        return Err(AppError::InvalidConfig("feed name cannot be empty".into()));
    }
    // names become a path segment of the RSS route
    if feed.name.contains('/') {
        return Err(AppError::InvalidConfig(format!(
            "feed name cannot contain '/': {}",
            feed.name
        )));
    }
    if let Err(e) = Url::parse(&feed.url_to_fetch) {
        return Err(AppError::InvalidConfig(format!(
            "feed {}: invalid url_to_fetch {}: {}",
            feed.name, feed.url_to_fetch, e
        )));
    }
    let fields = feed.cron.split_whitespace().count();
    if !(5..=7).contains(&fields) {
        return Err(AppError::InvalidConfig(format!(
            "feed {}: cron expression must have 5, 6 or 7 fields, got {:?}",
            feed.name, feed.cron
        )));
    }
    if let Err(e) = cron::Schedule::from_str(&feed.schedule()) {
        return Err(AppError::InvalidConfig(format!(
            "feed {}: invalid cron expression {:?}: {}",
            feed.name, feed.cron, e
        )));
    }
    Ok(())
}
