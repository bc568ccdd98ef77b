//! Application layer: use cases over the domain repositories

pub mod booking_service;
pub mod review_service;
pub mod vehicle_service;

pub use booking_service::{BookingChange, BookingRules, BookingService, NewBooking};
pub use review_service::{NewReview, ReviewService};
pub use vehicle_service::{NewVehicle, VehicleService};
