use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FeedMeta::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FeedMeta::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FeedMeta::FeedName).string().not_null().unique_key())
                    .col(
                        ColumnDef::new(FeedMeta::LastFetched)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FeedMeta::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum FeedMeta {
    Table,
    Id,
    FeedName,
    LastFetched,
}
