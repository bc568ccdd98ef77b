//! Review aggregate

pub mod model;
pub mod repository;

pub use model::{RatingSummary, Review, Reviewer, VehicleSnapshot};
pub use repository::ReviewRepository;
