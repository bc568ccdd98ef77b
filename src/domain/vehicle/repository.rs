//! Vehicle repository interface

use async_trait::async_trait;

use super::model::Vehicle;
use crate::domain::DomainResult;

#[async_trait]
pub trait VehicleRepository: Send + Sync {
    /// Save a new vehicle
    async fn save(&self, vehicle: Vehicle) -> DomainResult<()>;

    /// Find vehicle by ID
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Vehicle>>;

    /// Every listed vehicle, newest first
    async fn find_all(&self) -> DomainResult<Vec<Vehicle>>;

    /// Vehicles listed by an owner, newest first
    async fn find_by_owner(&self, owner_email: &str) -> DomainResult<Vec<Vehicle>>;

    /// Persist the owner-editable listing fields.
    /// Rating and counters are left untouched.
    async fn update(&self, vehicle: Vehicle) -> DomainResult<()>;

    /// Delete a vehicle together with its bookings and reviews
    async fn delete(&self, id: &str) -> DomainResult<()>;
}
