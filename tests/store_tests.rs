mod common;

use chrono::{DateTime, FixedOffset, TimeZone};
use rss_sift::db::{cursors, entries};
use rss_sift::entities::feed_entry::entry_hash;

fn at(hour: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2024, 5, 1, hour, 0, 0)
        .unwrap()
}

fn entry(feed: &str, title: &str, link: &str, hour: u32) -> entries::NewEntry {
    entries::NewEntry {
        feed_name: feed.to_string(),
        title: title.to_string(),
        link: link.to_string(),
        additional_info: Some("Year: 2024".to_string()),
        accepted_by_filter: true,
        created: at(hour),
    }
}

#[tokio::test]
async fn duplicate_title_and_link_is_stored_once() {
    common::setup();
    let db = common::memory_db().await;

    let first = entries::insert_if_absent(&db, entry("books", "Rust for Rustaceans", "/b/1", 9))
        .await
        .unwrap();
    let second = entries::insert_if_absent(&db, entry("books", "Rust for Rustaceans", "/b/1", 10))
        .await
        .unwrap();

    assert!(first);
    assert!(!second);
    let stored = entries::list_by_feed(&db, "books", 100).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].created, at(9));
    assert!(entries::exists(&db, &entry_hash("Rust for Rustaceans", "/b/1")).await.unwrap());
}

#[tokio::test]
async fn concurrent_duplicate_inserts_do_not_fail() {
    common::setup();
    let db = common::memory_db().await;

    let (a, b) = tokio::join!(
        entries::insert_if_absent(&db, entry("books", "Zero To Production", "/b/2", 9)),
        entries::insert_if_absent(&db, entry("books", "Zero To Production", "/b/2", 9)),
    );

    assert_eq!([a.unwrap(), b.unwrap()].iter().filter(|w| **w).count(), 1);
    assert_eq!(entries::list_by_feed(&db, "books", 100).await.unwrap().len(), 1);
}

#[tokio::test]
async fn list_is_newest_first_and_limited() {
    common::setup();
    let db = common::memory_db().await;

    for (i, hour) in [8, 12, 10].iter().enumerate() {
        let link = format!("/b/{}", i);
        entries::insert_if_absent(&db, entry("books", &format!("Title {}", hour), &link, *hour))
            .await
            .unwrap();
    }

    let titles: Vec<String> = entries::list_by_feed(&db, "books", 100)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.title)
        .collect();
    assert_eq!(titles, vec!["Title 12", "Title 10", "Title 8"]);

    let limited = entries::list_by_feed(&db, "books", 2).await.unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].title, "Title 12");
}

#[tokio::test]
async fn delete_by_feed_leaves_other_feeds_alone() {
    common::setup();
    let db = common::memory_db().await;

    entries::insert_if_absent(&db, entry("books", "A", "/a", 9)).await.unwrap();
    entries::insert_if_absent(&db, entry("books", "B", "/b", 9)).await.unwrap();
    entries::insert_if_absent(&db, entry("papers", "C", "/c", 9)).await.unwrap();

    let removed = entries::delete_by_feed(&db, "books").await.unwrap();

    assert_eq!(removed, 2);
    assert!(entries::list_by_feed(&db, "books", 100).await.unwrap().is_empty());
    let papers = entries::list_by_feed(&db, "papers", 100).await.unwrap();
    assert_eq!(papers.len(), 1);
    assert_eq!(papers[0].title, "C");
}

#[tokio::test]
async fn cursor_is_created_then_overwritten() {
    common::setup();
    let db = common::memory_db().await;

    assert!(cursors::get_cursor(&db, "books").await.unwrap().is_none());

    cursors::set_cursor(&db, "books", at(9)).await.unwrap();
    cursors::set_cursor(&db, "books", at(11)).await.unwrap();
    cursors::set_cursor(&db, "papers", at(10)).await.unwrap();

    let books = cursors::get_cursor(&db, "books").await.unwrap().unwrap();
    assert_eq!(books.last_fetched, at(11));

    let all = cursors::list_cursors(&db).await.unwrap();
    assert_eq!(
        all.iter().map(|c| c.feed_name.as_str()).collect::<Vec<_>>(),
        vec!["books", "papers"]
    );
}
