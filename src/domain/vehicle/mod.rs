//! Vehicle aggregate
//!
//! Contains the Vehicle entity, listing types, and repository interface.

pub mod model;
pub mod repository;

pub use model::{Availability, Vehicle, VehicleDetails, VehiclePatch};
pub use repository::VehicleRepository;
