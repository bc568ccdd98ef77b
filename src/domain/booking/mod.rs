//! Booking aggregate
//!
//! Contains the Booking entity, the date range and status types, and the
//! repository interface.

pub mod model;
pub mod repository;

pub use model::{Booking, BookingAction, BookingStatus, DateRange, PublicBooking};
pub use repository::BookingRepository;
