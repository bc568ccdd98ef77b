//! Vehicle ledger operations exposed to owners

use std::sync::Arc;

use tracing::info;

use crate::domain::{
    authorize, Action, Actor, Availability, DomainError, DomainResult, RepositoryProvider,
    Subject, Vehicle, VehicleDetails, VehiclePatch,
};

#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub model: String,
    pub daily_price: i64,
    pub location: String,
    pub availability: Option<Availability>,
    pub details: VehicleDetails,
}

pub struct VehicleService {
    repos: Arc<dyn RepositoryProvider>,
}

impl VehicleService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    /// List a vehicle owned by the actor
    pub async fn create(&self, actor: &Actor, req: NewVehicle) -> DomainResult<Vehicle> {
        let mut vehicle = Vehicle::new(
            req.model,
            req.daily_price,
            req.location,
            &actor.email,
            actor.name.clone(),
        )?
        .with_details(req.details)?;
        if let Some(availability) = req.availability {
            vehicle.availability = availability;
        }
        self.repos.vehicles().save(vehicle.clone()).await?;

        info!(
            vehicle_id = vehicle.id.as_str(),
            owner = vehicle.owner_email.as_str(),
            daily_price = vehicle.daily_price,
            "Vehicle listed"
        );
        Ok(vehicle)
    }

    pub async fn get(&self, id: &str) -> DomainResult<Vehicle> {
        self.repos
            .vehicles()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Vehicle", id))
    }

    /// Public browse, newest listing first
    pub async fn list_all(&self) -> DomainResult<Vec<Vehicle>> {
        self.repos.vehicles().find_all().await
    }

    pub async fn list_owner(&self, actor: &Actor, owner_email: &str) -> DomainResult<Vec<Vehicle>> {
        authorize(actor, Action::ViewOwn, Subject::Account(owner_email))?;
        self.repos.vehicles().find_by_owner(owner_email).await
    }

    /// Change listing fields; counters are never touched here
    pub async fn update(
        &self,
        actor: &Actor,
        id: &str,
        patch: VehiclePatch,
    ) -> DomainResult<Vehicle> {
        let mut vehicle = self.get(id).await?;
        authorize(actor, Action::UpdateVehicle, Subject::Vehicle(&vehicle))?;

        vehicle.apply(patch)?;
        self.repos.vehicles().update(vehicle).await?;

        info!(vehicle_id = id, "Vehicle updated");
        // Re-read so concurrently bumped counters are current
        self.get(id).await
    }

    /// Remove the vehicle along with its bookings and reviews
    pub async fn delete(&self, actor: &Actor, id: &str) -> DomainResult<()> {
        let vehicle = self.get(id).await?;
        authorize(actor, Action::DeleteVehicle, Subject::Vehicle(&vehicle))?;

        self.repos.vehicles().delete(id).await?;
        info!(vehicle_id = id, owner = vehicle.owner_email.as_str(), "Vehicle deleted");
        Ok(())
    }
}
