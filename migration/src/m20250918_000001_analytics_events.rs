//! Analytics event log migration
//!
//! Creates the append-only analytics_events table. Rows are written once by
//! the tracking endpoint and never updated or deleted by the application.
//! product_id is a soft reference (product or gallery image, depending on
//! the event tag) with no foreign key, so deleting an entity keeps its
//! historical events as orphans.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AnalyticsEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AnalyticsEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::Event)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(AnalyticsEvents::Page).text().not_null())
                    .col(
                        ColumnDef::new(AnalyticsEvents::ProductId)
                            .string_len(64)
                            .null(),
                    )
                    .col(ColumnDef::new(AnalyticsEvents::Metadata).text().null())
                    .col(ColumnDef::new(AnalyticsEvents::UserAgent).text().null())
                    .col(
                        ColumnDef::new(AnalyticsEvents::IpHash)
                            .string_len(16)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::CreatedAt)
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
                    .name("idx_analytics_events_event")
                    .table(AnalyticsEvents::Table)
                    .col(AnalyticsEvents::Event)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_analytics_events_created_at")
                    .table(AnalyticsEvents::Table)
                    .col(AnalyticsEvents::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_analytics_events_product_id")
                    .table(AnalyticsEvents::Table)
                    .col(AnalyticsEvents::ProductId)
                    .to_owned(),
            )
            .await?;

        // Composite index for windowed per-event-type queries
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_analytics_events_event_time")
                    .table(AnalyticsEvents::Table)
                    .col(AnalyticsEvents::Event)
                    .col(AnalyticsEvents::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_analytics_events_event_time")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_analytics_events_product_id")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_analytics_events_created_at")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(Index::drop().name("idx_analytics_events_event").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(AnalyticsEvents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AnalyticsEvents {
    #[sea_orm(iden = "analytics_events")]
    Table,
    Id,
    Event,
    Page,
    ProductId,
    Metadata,
    UserAgent,
    IpHash,
    CreatedAt,
}
