//! Vehicle DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{Availability, DomainResult, Vehicle, VehicleDetails, VehiclePatch};

/// Vehicle listing with its rating and booking counters
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VehicleResponse {
    pub id: String,
    pub model: String,
    /// Price per day in minor currency units
    pub daily_price: i64,
    pub location: String,
    /// `Available` or `Unavailable`
    pub availability: String,
    pub owner_email: String,
    pub owner_name: Option<String>,
    pub registration: String,
    pub description: String,
    pub features: Vec<String>,
    pub image_urls: Vec<String>,
    pub rating: f64,
    pub review_count: i64,
    pub booking_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Vehicle> for VehicleResponse {
    fn from(v: Vehicle) -> Self {
        Self {
            id: v.id,
            model: v.model,
            daily_price: v.daily_price,
            location: v.location,
            availability: v.availability.to_string(),
            owner_email: v.owner_email,
            owner_name: v.owner_name,
            registration: v.registration,
            description: v.description,
            features: v.features,
            image_urls: v.image_urls,
            rating: v.rating,
            review_count: v.review_count,
            booking_count: v.booking_count,
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 1, max = 120, message = "model is required"))]
    pub model: String,
    #[validate(range(min = 1, message = "daily_price must be positive"))]
    pub daily_price: i64,
    #[validate(length(min = 1, max = 200, message = "location is required"))]
    pub location: String,
    /// Defaults to `Available`
    pub availability: Option<String>,
    #[validate(length(min = 1, max = 32, message = "registration is required"))]
    pub registration: String,
    #[validate(length(min = 10, max = 1000, message = "description must be 10-1000 characters"))]
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    /// Hosted photo URLs, at least one
    #[validate(length(min = 1, message = "at least one image is required"))]
    pub image_urls: Vec<String>,
}

impl CreateVehicleRequest {
    pub fn details(&self) -> VehicleDetails {
        VehicleDetails {
            registration: self.registration.clone(),
            description: self.description.clone(),
            features: self.features.clone(),
            image_urls: self.image_urls.clone(),
        }
    }
}

/// Listing fields to change; counters cannot be set
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 1, max = 120, message = "model must not be empty"))]
    pub model: Option<String>,
    #[validate(range(min = 1, message = "daily_price must be positive"))]
    pub daily_price: Option<i64>,
    #[validate(length(min = 1, max = 200, message = "location must not be empty"))]
    pub location: Option<String>,
    pub availability: Option<String>,
    #[validate(length(min = 1, max = 32, message = "registration must not be empty"))]
    pub registration: Option<String>,
    #[validate(length(min = 10, max = 1000, message = "description must be 10-1000 characters"))]
    pub description: Option<String>,
    pub features: Option<Vec<String>>,
    #[validate(length(min = 1, message = "at least one image is required"))]
    pub image_urls: Option<Vec<String>>,
}

impl UpdateVehicleRequest {
    pub fn into_patch(self) -> DomainResult<VehiclePatch> {
        Ok(VehiclePatch {
            model: self.model,
            daily_price: self.daily_price,
            location: self.location,
            availability: self
                .availability
                .map(|a| a.parse::<Availability>())
                .transpose()?,
            registration: self.registration,
            description: self.description,
            features: self.features,
            image_urls: self.image_urls,
        })
    }
}
