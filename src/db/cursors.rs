use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::entities::feed_cursor::{ActiveModel, Column, Model};
use crate::entities::FeedCursor;

pub async fn get_cursor<C: ConnectionTrait>(
    db: &C,
    feed_name: &str,
) -> Result<Option<Model>, DbErr> {
    FeedCursor::find()
        .filter(Column::FeedName.eq(feed_name))
        .one(db)
        .await
}

pub async fn list_cursors<C: ConnectionTrait>(db: &C) -> Result<Vec<Model>, DbErr> {
    FeedCursor::find()
        .order_by_asc(Column::FeedName)
        .all(db)
        .await
}

/// Record a successful fetch, creating the cursor on first use.
pub async fn set_cursor<C: ConnectionTrait>(
    db: &C,
    feed_name: &str,
    at: DateTimeWithTimeZone,
) -> Result<(), DbErr> {
    let am = ActiveModel {
        feed_name: Set(feed_name.to_owned()),
        last_fetched: Set(at),
        ..Default::default()
    };

    FeedCursor::insert(am)
        .on_conflict(
            OnConflict::column(Column::FeedName)
                .update_column(Column::LastFetched)
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}
