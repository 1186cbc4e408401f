use sea_orm::entity::prelude::*;
use sha2::{Digest, Sha256};

/// An accepted article of one feed. Rows are never updated; `clean` is the
/// only way they leave the table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "feed_data")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i32,
    pub feed_name: String,
    pub title: String,
    pub link: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub additional_info: Option<String>,
    #[sea_orm(unique)]
    pub hash: String,
    /// false when the feed is configured to bypass the relevance filter
    pub accepted_by_filter: bool,
    pub created: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Content hash identifying an entry: hex SHA-256 over title followed by link.
pub fn entry_hash(title: &str, link: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(link.as_bytes());
    hex::encode(hasher.finalize())
}
