pub mod feed_cursor;
pub mod feed_entry;

pub use feed_cursor::Entity as FeedCursor;
pub use feed_entry::Entity as FeedEntry;
