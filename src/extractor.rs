//! Pulls article listings out of a fetched page.
//!
//! The page layout is fixed:
//!
//! ```text
//! div.row
//!   div.article
//!     h1 > a.title-link[href]       -> title, link
//!     div.text-center (with a <b>)  -> additional info
//! ```

use select::document::Document;
use select::node::Node;
use select::predicate::{Class, Name, Predicate};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub additional_info: Option<String>,
}

/// Lazily walk `document` and yield its articles in document order.
/// Rows missing any part of the title path are skipped.
pub fn iter_articles<'a>(
    document: &'a Document,
    url_prefix: &'a str,
) -> impl Iterator<Item = Article> + 'a {
    document
        .find(Name("div").and(Class("row")))
        .filter_map(move |row| article_from_row(row, url_prefix))
}

/// Parse `html` and collect its articles. The parsed document is not `Send`,
/// so async callers extract eagerly before the next await point.
pub fn extract_articles(html: &str, url_prefix: &str) -> Vec<Article> {
    let document = Document::from(html);
    iter_articles(&document, url_prefix).collect()
}

fn article_from_row(row: Node<'_>, url_prefix: &str) -> Option<Article> {
    let article = row.find(Name("div").and(Class("article"))).next()?;
    let h1 = article.find(Name("h1")).next()?;
    let anchor = h1.find(Name("a").and(Class("title-link"))).next()?;

    let title = normalize_text(&anchor.text());
    if title.is_empty() {
        return None;
    }
    let href = anchor.attr("href")?.trim();
    if href.is_empty() {
        return None;
    }

    let additional_info = article
        .find(Name("div").and(Class("text-center")))
        .find(|div| div.find(Name("b")).next().is_some())
        .map(|div| normalize_text(&div.text()))
        .filter(|text| !text.is_empty());

    Some(Article {
        title,
        link: resolve_link(url_prefix, href),
        additional_info,
    })
}

/// Absolute links are kept; anything else is appended to the prefix verbatim.
pub fn resolve_link(url_prefix: &str, href: &str) -> String {
    match Url::parse(href) {
        Ok(_) => href.to_string(),
        Err(_) => format!("{}{}", url_prefix, href),
    }
}

fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
