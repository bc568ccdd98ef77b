//! Booking DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{Booking, PublicBooking};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookingResponse {
    pub id: String,
    pub vehicle_id: String,
    pub renter_email: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Rental length, `end_date - start_date`
    pub days: i64,
    /// Minor currency units
    pub total_price: i64,
    /// `Pending`, `Confirmed`, `Canceled` or `Completed`
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            days: b.period.days(),
            start_date: b.period.start(),
            end_date: b.period.end(),
            id: b.id,
            vehicle_id: b.vehicle_id,
            renter_email: b.renter_email,
            total_price: b.total_price,
            status: b.status.as_str().to_string(),
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

/// Occupied interval shown to anonymous visitors
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PublicBookingResponse {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
}

impl From<PublicBooking> for PublicBookingResponse {
    fn from(b: PublicBooking) -> Self {
        Self {
            start_date: b.start,
            end_date: b.end,
            status: b.status.as_str().to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookingRequest {
    #[validate(length(min = 1, message = "vehicle_id is required"))]
    pub vehicle_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Optional client-side total; must equal `days * daily_price`
    #[validate(range(min = 0, message = "total_price must not be negative"))]
    pub total_price: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBookingRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(range(min = 0, message = "total_price must not be negative"))]
    pub total_price: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBookingStatusRequest {
    /// `confirm` (vehicle owner) or `cancel` (renter)
    #[validate(length(min = 1, message = "action is required"))]
    pub action: String,
}
