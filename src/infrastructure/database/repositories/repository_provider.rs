//! SeaORM implementation of RepositoryProvider

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::domain::booking::BookingRepository;
use crate::domain::repositories::RepositoryProvider;
use crate::domain::review::ReviewRepository;
use crate::domain::vehicle::VehicleRepository;
use crate::domain::DomainResult;

use super::booking_repository::SeaOrmBookingRepository;
use super::{db_err, WriteGate};
use super::review_repository::SeaOrmReviewRepository;
use super::vehicle_repository::SeaOrmVehicleRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
/// The repositories share one write gate, so compound writes on SQLite take
/// turns across aggregates.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let vehicle = repos.vehicles().find_by_id("v-1").await?;
/// let booking = repos.bookings().insert_reserving(booking).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    db: DatabaseConnection,
    vehicles: SeaOrmVehicleRepository,
    bookings: SeaOrmBookingRepository,
    reviews: SeaOrmReviewRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        let gate = WriteGate::for_backend(&db);
        Self {
            vehicles: SeaOrmVehicleRepository::new(db.clone(), gate.clone()),
            bookings: SeaOrmBookingRepository::new(db.clone(), gate.clone()),
            reviews: SeaOrmReviewRepository::new(db.clone(), gate),
            db,
        }
    }
}

#[async_trait]
impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn vehicles(&self) -> &dyn VehicleRepository {
        &self.vehicles
    }

    fn bookings(&self) -> &dyn BookingRepository {
        &self.bookings
    }

    fn reviews(&self) -> &dyn ReviewRepository {
        &self.reviews
    }

    async fn ping(&self) -> DomainResult<()> {
        self.db.ping().await.map_err(db_err)
    }
}
