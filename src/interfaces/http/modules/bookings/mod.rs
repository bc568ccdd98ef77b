//! Booking module: reservations, status changes, availability view

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
