pub mod cursors;
pub mod entries;

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

pub const DEFAULT_DATABASE_URL: &str = "sqlite:./feeds.db?mode=rwc";

/// Open the connection pool and bring the schema up to date.
pub async fn connect(url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(url.to_owned());
    options.sqlx_logging(false);
    // every connection of an in-memory pool would see its own empty database
    if url.contains(":memory:") {
        options.max_connections(1).min_connections(1);
    }

    tracing::info!("Connecting to database: {}", url);
    let conn = Database::connect(options).await?;
    Migrator::up(&conn, None).await?;
    Ok(conn)
}
