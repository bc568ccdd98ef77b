//! Add descriptive listing fields to vehicles table

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_vehicles::Vehicles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Vehicles::Table)
                    .add_column(
                        ColumnDef::new(VehicleDetails::Registration)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Vehicles::Table)
                    .add_column(
                        ColumnDef::new(VehicleDetails::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .to_owned(),
            )
            .await?;

        // Lists are stored as JSON text
        manager
            .alter_table(
                Table::alter()
                    .table(Vehicles::Table)
                    .add_column(
                        ColumnDef::new(VehicleDetails::FeaturesJson)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Vehicles::Table)
                    .add_column(
                        ColumnDef::new(VehicleDetails::ImageUrlsJson)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .to_owned(),
            )
            .await?;

        // Public browse is newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_vehicles_created_at")
                    .table(Vehicles::Table)
                    .col(Vehicles::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_vehicles_created_at")
                    .table(Vehicles::Table)
                    .to_owned(),
            )
            .await?;

        // SQLite cannot drop columns; the detail columns stay
        Ok(())
    }
}

#[derive(Iden)]
enum VehicleDetails {
    Registration,
    Description,
    FeaturesJson,
    ImageUrlsJson,
}
