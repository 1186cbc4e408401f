use chrono_tz::Tz;
use rss::{Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder};

use crate::config::FeedConfig;
use crate::entities::feed_entry;
use crate::error::AppError;

fn entry_item(entry: &feed_entry::Model, tz: Tz) -> Item {
    ItemBuilder::default()
        .title(Some(entry.title.clone()))
        .link(Some(entry.link.clone()))
        .description(entry.additional_info.clone())
        .guid(Some(
            GuidBuilder::default()
                .value(entry.link.clone())
                .permalink(true)
                .build(),
        ))
        .pub_date(Some(entry.created.with_timezone(&tz).to_rfc2822()))
        .build()
}

/// Channel for `feed`; items keep the order of `entries` and date in `tz`.
pub fn build_channel(feed: &FeedConfig, entries: &[feed_entry::Model], tz: Tz) -> Channel {
    ChannelBuilder::default()
        .title(format!("{} RSS Feed", feed.name))
        .link(feed.url_to_fetch.clone())
        .description(format!("This is the RSS feed for {}", feed.name))
        .items(
            entries
                .iter()
                .map(|entry| entry_item(entry, tz))
                .collect::<Vec<_>>(),
        )
        .build()
}

pub fn render_rss(
    feed: &FeedConfig,
    entries: &[feed_entry::Model],
    tz: Tz,
) -> Result<String, AppError> {
    let channel = build_channel(feed, entries, tz);
    let bytes = channel
        .pretty_write_to(Vec::new(), b' ', 2)
        .map_err(|e| AppError::RenderFailed(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| AppError::RenderFailed(e.to_string()))
}
