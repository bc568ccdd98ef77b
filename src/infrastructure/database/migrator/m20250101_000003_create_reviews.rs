//! Create reviews table
//!
//! One review per (vehicle, reviewer), enforced by a unique index.

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_vehicles::Vehicles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reviews::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reviews::VehicleId).string().not_null())
                    .col(ColumnDef::new(Reviews::BookingId).string().not_null())
                    .col(ColumnDef::new(Reviews::VehicleModel).string().not_null())
                    .col(ColumnDef::new(Reviews::OwnerEmail).string().not_null())
                    .col(ColumnDef::new(Reviews::OwnerName).string())
                    .col(ColumnDef::new(Reviews::ReviewerEmail).string().not_null())
                    .col(ColumnDef::new(Reviews::ReviewerName).string())
                    .col(ColumnDef::new(Reviews::ReviewerPhoto).string())
                    .col(ColumnDef::new(Reviews::Rating).integer().not_null())
                    .col(ColumnDef::new(Reviews::Comment).text().not_null())
                    .col(
                        ColumnDef::new(Reviews::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reviews::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_vehicle")
                            .from(Reviews::Table, Reviews::VehicleId)
                            .to(Vehicles::Table, Vehicles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_vehicle_reviewer")
                    .table(Reviews::Table)
                    .col(Reviews::VehicleId)
                    .col(Reviews::ReviewerEmail)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_reviewer")
                    .table(Reviews::Table)
                    .col(Reviews::ReviewerEmail)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reviews::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Reviews {
    Table,
    Id,
    VehicleId,
    BookingId,
    VehicleModel,
    OwnerEmail,
    OwnerName,
    ReviewerEmail,
    ReviewerName,
    ReviewerPhoto,
    Rating,
    Comment,
    CreatedAt,
    UpdatedAt,
}
