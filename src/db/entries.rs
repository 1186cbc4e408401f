use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entities::feed_entry::{self, ActiveModel, Column, Model};
use crate::entities::FeedEntry;

/// Everything needed to store an entry; the hash is derived from title and link.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub feed_name: String,
    pub title: String,
    pub link: String,
    pub additional_info: Option<String>,
    pub accepted_by_filter: bool,
    pub created: sea_orm::prelude::DateTimeWithTimeZone,
}

impl NewEntry {
    pub fn hash(&self) -> String {
        feed_entry::entry_hash(&self.title, &self.link)
    }
}

/// Insert unless an entry with the same hash exists. Returns whether a row
/// was written. Losing a race against a concurrent insert is not an error.
pub async fn insert_if_absent<C: ConnectionTrait>(db: &C, entry: NewEntry) -> Result<bool, DbErr> {
    let am = ActiveModel {
        hash: Set(entry.hash()),
        feed_name: Set(entry.feed_name),
        title: Set(entry.title),
        link: Set(entry.link),
        additional_info: Set(entry.additional_info),
        accepted_by_filter: Set(entry.accepted_by_filter),
        created: Set(entry.created),
        ..Default::default()
    };

    let rows = FeedEntry::insert(am)
        .on_conflict(OnConflict::column(Column::Hash).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;
    Ok(rows > 0)
}

pub async fn exists<C: ConnectionTrait>(db: &C, hash: &str) -> Result<bool, DbErr> {
    let count = FeedEntry::find()
        .filter(Column::Hash.eq(hash))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Entries of one feed, most recent first.
pub async fn list_by_feed<C: ConnectionTrait>(
    db: &C,
    feed_name: &str,
    limit: u64,
) -> Result<Vec<Model>, DbErr> {
    FeedEntry::find()
        .filter(Column::FeedName.eq(feed_name))
        .order_by_desc(Column::Created)
        .order_by_desc(Column::Id)
        .limit(limit)
        .all(db)
        .await
}

/// Remove every entry of `feed_name`; returns the number of rows deleted.
pub async fn delete_by_feed<C: ConnectionTrait>(db: &C, feed_name: &str) -> Result<u64, DbErr> {
    let res = FeedEntry::delete_many()
        .filter(Column::FeedName.eq(feed_name))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}
