//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_vehicles;
mod m20250101_000002_create_bookings;
mod m20250101_000003_create_reviews;
mod m20250101_000004_add_listing_details_to_vehicles;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_vehicles::Migration),
            Box::new(m20250101_000002_create_bookings::Migration),
            Box::new(m20250101_000003_create_reviews::Migration),
            Box::new(m20250101_000004_add_listing_details_to_vehicles::Migration),
        ]
    }
}
