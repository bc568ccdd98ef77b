//! Domain layer: entities, value types, access policy and repository traits.

pub mod booking;
pub mod policy;
pub mod repositories;
pub mod review;
pub mod vehicle;

pub use booking::{Booking, BookingAction, BookingStatus, DateRange, PublicBooking};
pub use policy::{authorize, can_perform, Action, Actor, Subject};
pub use repositories::{DomainResult, RepositoryProvider};
pub use review::{RatingSummary, Review};
pub use vehicle::{Availability, Vehicle, VehicleDetails, VehiclePatch};

// Re-export DomainError from shared for convenience
pub use crate::shared::errors::DomainError;
