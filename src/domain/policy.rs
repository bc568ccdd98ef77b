//! Access policy
//!
//! Pure decision function keyed on the acting identity's email versus the
//! owning email fields of the subject. Consulted before every mutation and
//! every identity-scoped read.

use super::booking::Booking;
use super::review::Review;
use super::vehicle::Vehicle;
use super::{DomainError, DomainResult};

/// Authenticated caller, derived from a verified identity token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub email: String,
    pub name: Option<String>,
    pub photo_url: Option<String>,
}

impl Actor {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
            photo_url: None,
        }
    }

    fn is(&self, email: &str) -> bool {
        self.email == email
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// List bookings, vehicles or reviews belonging to an account
    ViewOwn,
    UpdateVehicle,
    DeleteVehicle,
    ViewVehicleBookings,
    ConfirmBooking,
    CancelBooking,
    EditBooking,
    DeleteBooking,
    CreateReview,
    UpdateReview,
    DeleteReview,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ViewOwn => "view records of",
            Self::UpdateVehicle => "update",
            Self::DeleteVehicle => "delete",
            Self::ViewVehicleBookings => "view bookings of",
            Self::ConfirmBooking => "confirm",
            Self::CancelBooking => "cancel",
            Self::EditBooking => "edit",
            Self::DeleteBooking => "delete",
            Self::CreateReview => "review",
            Self::UpdateReview => "update",
            Self::DeleteReview => "delete",
        }
    }
}

/// What an action is performed on
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    /// An account, identified by its email
    Account(&'a str),
    Vehicle(&'a Vehicle),
    Booking {
        booking: &'a Booking,
        vehicle_owner: &'a str,
    },
    /// Reviews carry the vehicle owner's email in their snapshot
    Review(&'a Review),
}

impl Subject<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Self::Account(_) => "account",
            Self::Vehicle(_) => "vehicle",
            Self::Booking { .. } => "booking",
            Self::Review(_) => "review",
        }
    }
}

/// Whether `actor` may perform `action` on `subject`.
/// Action/subject pairs that make no sense are always denied.
pub fn can_perform(actor: &Actor, action: Action, subject: Subject<'_>) -> bool {
    match (action, subject) {
        (Action::ViewOwn, Subject::Account(email)) => actor.is(email),

        (
            Action::UpdateVehicle | Action::DeleteVehicle | Action::ViewVehicleBookings,
            Subject::Vehicle(v),
        ) => actor.is(&v.owner_email),

        (Action::ConfirmBooking, Subject::Booking { vehicle_owner, .. }) => {
            actor.is(vehicle_owner)
        }
        (Action::CancelBooking | Action::EditBooking, Subject::Booking { booking, .. }) => {
            actor.is(&booking.renter_email)
        }
        (
            Action::DeleteBooking,
            Subject::Booking {
                booking,
                vehicle_owner,
            },
        ) => actor.is(&booking.renter_email) || actor.is(vehicle_owner),
        (Action::CreateReview, Subject::Booking { booking, .. }) => {
            actor.is(&booking.renter_email) && booking.status.is_reviewable()
        }

        (Action::UpdateReview, Subject::Review(r)) => actor.is(&r.reviewer_email),
        (Action::DeleteReview, Subject::Review(r)) => {
            actor.is(&r.reviewer_email) || actor.is(&r.owner_email)
        }

        _ => false,
    }
}

/// [`can_perform`] as a `Result`.
///
/// Identity mismatches are `Forbidden`. The renter reviewing a booking that
/// is not yet reviewable gets `Validation` instead.
pub fn authorize(actor: &Actor, action: Action, subject: Subject<'_>) -> DomainResult<()> {
    if can_perform(actor, action, subject) {
        return Ok(());
    }
    if let (Action::CreateReview, Subject::Booking { booking, .. }) = (action, subject) {
        if actor.is(&booking.renter_email) {
            return Err(DomainError::Validation(format!(
                "booking {} is {} and cannot be reviewed yet",
                booking.id, booking.status
            )));
        }
    }
    Err(DomainError::Forbidden(format!(
        "{} may not {} this {}",
        actor.email,
        action.as_str(),
        subject.kind()
    )))
}
