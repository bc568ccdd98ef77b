//! Booking repository interface
//!
//! Every mutating method is one atomic unit: the conflict re-check, the
//! booking write and the vehicle counter update either all commit or none do.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{Booking, BookingStatus, DateRange};
use crate::domain::DomainResult;

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Find booking by ID
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Booking>>;

    /// All bookings of a vehicle, newest first
    async fn find_by_vehicle(&self, vehicle_id: &str) -> DomainResult<Vec<Booking>>;

    /// All bookings made by a renter, newest first
    async fn find_by_renter(&self, renter_email: &str) -> DomainResult<Vec<Booking>>;

    /// Confirmed bookings of a vehicle overlapping `period`, optionally
    /// ignoring one booking (the one being edited or confirmed)
    async fn find_confirmed_overlapping(
        &self,
        vehicle_id: &str,
        period: &DateRange,
        exclude_id: Option<&str>,
    ) -> DomainResult<Vec<Booking>>;

    /// Insert a new booking and increment the vehicle's booking count.
    ///
    /// Fails with `NotFound` if the vehicle vanished, `Conflict` if the
    /// vehicle is unavailable or a confirmed booking now overlaps.
    async fn insert_reserving(&self, booking: Booking) -> DomainResult<Booking>;

    /// Move a non-terminal booking to `period` with a new total.
    ///
    /// Fails with `Conflict` if the booking became terminal or a confirmed
    /// booking of the same vehicle overlaps the new period.
    async fn reschedule(
        &self,
        id: &str,
        period: DateRange,
        total_price: i64,
        updated_at: DateTime<Utc>,
    ) -> DomainResult<Booking>;

    /// Compare-and-set status change from `from` to `to`.
    ///
    /// Fails with `Conflict` if the stored status is no longer `from`, or when
    /// confirming a booking that overlaps another confirmed booking.
    async fn set_status(
        &self,
        id: &str,
        from: BookingStatus,
        to: BookingStatus,
        updated_at: DateTime<Utc>,
    ) -> DomainResult<Booking>;

    /// Remove a booking, decrementing the vehicle's booking count unless the
    /// booking was `Canceled`. Returns the removed booking.
    async fn delete_releasing(&self, id: &str) -> DomainResult<Booking>;
}
