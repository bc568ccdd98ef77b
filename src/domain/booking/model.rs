//! Booking domain entity

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::{DomainError, DomainResult};

/// Rental interval in whole days. `start` is always strictly before `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> DomainResult<Self> {
        if start >= end {
            return Err(DomainError::Validation(format!(
                "end date {} must be after start date {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of billable days (`end - start`), always >= 1
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Inclusive-bound overlap: touching endpoints count as a conflict.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && self.end >= other.start
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Booking status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingStatus {
    /// Requested by the renter, awaiting the owner
    Pending,
    /// Accepted by the owner; blocks the dates
    Confirmed,
    /// Withdrawn by the renter
    Canceled,
    /// Rental finished
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Canceled => "Canceled",
            Self::Completed => "Completed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Canceled | Self::Completed)
    }

    /// Only confirmed bookings are hard availability blocks
    pub fn blocks_dates(&self) -> bool {
        matches!(self, Self::Confirmed)
    }

    pub fn is_reviewable(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Completed)
    }

    /// Statuses shown on the anonymous availability calendar
    pub fn is_publicly_visible(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Pending, Self::Canceled)
                | (Self::Confirmed, Self::Canceled)
        )
    }
}

impl FromStr for BookingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Confirmed" => Ok(Self::Confirmed),
            "Canceled" => Ok(Self::Canceled),
            "Completed" => Ok(Self::Completed),
            other => Err(DomainError::Validation(format!(
                "unknown booking status '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status change requested through the booking status endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingAction {
    Confirm,
    Cancel,
}

impl BookingAction {
    pub fn target_status(&self) -> BookingStatus {
        match self {
            Self::Confirm => BookingStatus::Confirmed,
            Self::Cancel => BookingStatus::Canceled,
        }
    }
}

impl FromStr for BookingAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirm" => Ok(Self::Confirm),
            "cancel" => Ok(Self::Cancel),
            other => Err(DomainError::Validation(format!(
                "invalid action '{}', expected 'confirm' or 'cancel'",
                other
            ))),
        }
    }
}

/// Vehicle reservation for a date range
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: String,
    pub vehicle_id: String,
    pub renter_email: String,
    pub period: DateRange,
    /// Total in minor currency units (days x daily price)
    pub total_price: i64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// New bookings always start out `Pending`.
    pub fn new(
        vehicle_id: impl Into<String>,
        renter_email: impl Into<String>,
        period: DateRange,
        total_price: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            vehicle_id: vehicle_id.into(),
            renter_email: renter_email.into(),
            period,
            total_price,
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this booking is a hard block that `period` would collide with
    pub fn blocks(&self, period: &DateRange) -> bool {
        self.status.blocks_dates() && self.period.overlaps(period)
    }

    pub fn public_view(&self) -> PublicBooking {
        PublicBooking {
            start: self.period.start(),
            end: self.period.end(),
            status: self.status,
        }
    }
}

/// Anonymous projection used by the availability calendar. Never carries the renter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicBooking {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub status: BookingStatus,
}

// ── Tests ──────────────────────────────────────────────────────
