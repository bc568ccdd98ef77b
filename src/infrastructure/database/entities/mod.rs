//! Database entities module

pub mod booking;
pub mod review;
pub mod vehicle;

pub use booking::Entity as Booking;
pub use review::Entity as Review;
pub use vehicle::Entity as Vehicle;
