use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FeedData::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FeedData::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FeedData::FeedName).string().not_null())
                    .col(ColumnDef::new(FeedData::Title).string().not_null())
                    .col(ColumnDef::new(FeedData::Link).string().not_null())
                    .col(ColumnDef::new(FeedData::AdditionalInfo).text().null())
                    // Dedup key: inserts race on this constraint, not on a prior lookup
                    .col(ColumnDef::new(FeedData::Hash).string().not_null().unique_key())
                    .col(
                        ColumnDef::new(FeedData::AcceptedByFilter)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(FeedData::Created)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_feed_data_feed_name_created")
                    .table(FeedData::Table)
                    .col(FeedData::FeedName)
                    .col(FeedData::Created)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FeedData::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum FeedData {
    Table,
    Id,
    FeedName,
    Title,
    Link,
    AdditionalInfo,
    Hash,
    AcceptedByFilter,
    Created,
}
