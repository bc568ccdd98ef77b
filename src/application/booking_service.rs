//! Booking engine: creation, conflict detection, status transitions,
//! editing and deletion of bookings.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::domain::{
    authorize, Action, Actor, Booking, BookingAction, DateRange, DomainError, DomainResult,
    PublicBooking, RepositoryProvider, Subject, Vehicle,
};
use crate::shared::{retry_with_backoff, RetryConfig};

/// Tunables for the booking engine
#[derive(Debug, Clone)]
pub struct BookingRules {
    /// Longest allowed rental in days
    pub max_booking_days: i64,
    /// Backoff for store writes that hit a transient failure
    pub retry: RetryConfig,
}

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            max_booking_days: 30,
            retry: RetryConfig::default(),
        }
    }
}

/// Booking request from a renter
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub vehicle_id: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Total the client displayed; must match the server-side quote if given
    pub total_price: Option<i64>,
}

/// New dates (and optionally the expected total) for an existing booking
#[derive(Debug, Clone)]
pub struct BookingChange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total_price: Option<i64>,
}

pub struct BookingService {
    repos: Arc<dyn RepositoryProvider>,
    rules: BookingRules,
}

impl BookingService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, rules: BookingRules) -> Self {
        Self { repos, rules }
    }

    async fn vehicle(&self, id: &str) -> DomainResult<Vehicle> {
        self.repos
            .vehicles()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Vehicle", id))
    }

    async fn booking_with_owner(&self, id: &str) -> DomainResult<(Booking, Vehicle)> {
        let booking = self
            .repos
            .bookings()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Booking", id))?;
        let vehicle = self.vehicle(&booking.vehicle_id).await?;
        Ok((booking, vehicle))
    }

    /// Server-side total for `period`, checked against the caller's figure
    fn price(
        &self,
        vehicle: &Vehicle,
        period: &DateRange,
        claimed: Option<i64>,
    ) -> DomainResult<i64> {
        if period.days() > self.rules.max_booking_days {
            return Err(DomainError::Validation(format!(
                "bookings are limited to {} days, requested {}",
                self.rules.max_booking_days,
                period.days()
            )));
        }
        let total = vehicle.quote(period)?;
        match claimed {
            Some(claimed) if claimed != total => Err(DomainError::Validation(format!(
                "total price {} does not match quoted {}",
                claimed, total
            ))),
            _ => Ok(total),
        }
    }

    /// Cheap pre-check so obvious conflicts fail before a transaction is
    /// opened. The store re-checks inside the write.
    async fn ensure_free(
        &self,
        vehicle_id: &str,
        period: &DateRange,
        exclude_id: Option<&str>,
    ) -> DomainResult<()> {
        let blocking = self
            .repos
            .bookings()
            .find_confirmed_overlapping(vehicle_id, period, exclude_id)
            .await?;
        if let Some(existing) = blocking.first() {
            return Err(DomainError::Conflict(format!(
                "vehicle {} is already booked for {}",
                vehicle_id, existing.period
            )));
        }
        Ok(())
    }

    pub async fn create_booking(&self, actor: &Actor, req: NewBooking) -> DomainResult<Booking> {
        let period = DateRange::new(req.start, req.end)?;
        let vehicle = self.vehicle(&req.vehicle_id).await?;
        if !vehicle.is_available() {
            return Err(DomainError::Conflict(format!(
                "vehicle {} is not available",
                vehicle.id
            )));
        }
        let total = self.price(&vehicle, &period, req.total_price)?;
        self.ensure_free(&vehicle.id, &period, None).await?;

        let booking = Booking::new(&vehicle.id, &actor.email, period, total);
        let created = retry_with_backoff(
            self.rules.retry.clone(),
            || self.repos.bookings().insert_reserving(booking.clone()),
            DomainError::is_transient,
            "create_booking",
        )
        .await?;

        metrics::counter!("bookings_created_total").increment(1);
        info!(
            booking_id = created.id.as_str(),
            vehicle_id = created.vehicle_id.as_str(),
            renter = created.renter_email.as_str(),
            period = %created.period,
            total_price = created.total_price,
            "Booking created"
        );
        Ok(created)
    }

    pub async fn update_booking(
        &self,
        actor: &Actor,
        booking_id: &str,
        change: BookingChange,
    ) -> DomainResult<Booking> {
        let (booking, vehicle) = self.booking_with_owner(booking_id).await?;
        authorize(
            actor,
            Action::EditBooking,
            Subject::Booking {
                booking: &booking,
                vehicle_owner: &vehicle.owner_email,
            },
        )?;

        let period = DateRange::new(change.start, change.end)?;
        if booking.status.is_terminal() {
            return Err(DomainError::Conflict(format!(
                "booking {} is {} and can no longer be edited",
                booking.id, booking.status
            )));
        }
        let total = self.price(&vehicle, &period, change.total_price)?;
        self.ensure_free(&vehicle.id, &period, Some(&booking.id)).await?;

        let now = Utc::now();
        let updated = retry_with_backoff(
            self.rules.retry.clone(),
            || {
                self.repos
                    .bookings()
                    .reschedule(&booking.id, period, total, now)
            },
            DomainError::is_transient,
            "update_booking",
        )
        .await?;

        info!(
            booking_id = updated.id.as_str(),
            period = %updated.period,
            total_price = updated.total_price,
            "Booking rescheduled"
        );
        Ok(updated)
    }

    /// Apply `confirm` (vehicle owner) or `cancel` (renter).
    ///
    /// Permission is checked before the transition, so a caller without the
    /// right always gets `Forbidden` whatever state the booking is in.
    pub async fn update_booking_status(
        &self,
        actor: &Actor,
        booking_id: &str,
        action: &str,
    ) -> DomainResult<Booking> {
        let action: BookingAction = action.parse()?;
        let (booking, vehicle) = self.booking_with_owner(booking_id).await?;

        let permission = match action {
            BookingAction::Confirm => Action::ConfirmBooking,
            BookingAction::Cancel => Action::CancelBooking,
        };
        authorize(
            actor,
            permission,
            Subject::Booking {
                booking: &booking,
                vehicle_owner: &vehicle.owner_email,
            },
        )?;

        let target = action.target_status();
        if !booking.status.can_transition_to(target) {
            return Err(DomainError::Conflict(format!(
                "booking {} is {} and cannot become {}",
                booking.id, booking.status, target
            )));
        }

        let now = Utc::now();
        let updated = retry_with_backoff(
            self.rules.retry.clone(),
            || {
                self.repos
                    .bookings()
                    .set_status(&booking.id, booking.status, target, now)
            },
            DomainError::is_transient,
            "update_booking_status",
        )
        .await?;

        metrics::counter!("booking_transitions_total", "status" => target.as_str()).increment(1);
        info!(
            booking_id = updated.id.as_str(),
            from = booking.status.as_str(),
            to = target.as_str(),
            actor = actor.email.as_str(),
            "Booking status changed"
        );
        Ok(updated)
    }

    pub async fn delete_booking(&self, actor: &Actor, booking_id: &str) -> DomainResult<()> {
        let (booking, vehicle) = self.booking_with_owner(booking_id).await?;
        authorize(
            actor,
            Action::DeleteBooking,
            Subject::Booking {
                booking: &booking,
                vehicle_owner: &vehicle.owner_email,
            },
        )?;

        let removed = retry_with_backoff(
            self.rules.retry.clone(),
            || self.repos.bookings().delete_releasing(&booking.id),
            DomainError::is_transient,
            "delete_booking",
        )
        .await?;

        metrics::counter!("bookings_deleted_total").increment(1);
        info!(
            booking_id = removed.id.as_str(),
            vehicle_id = removed.vehicle_id.as_str(),
            status = removed.status.as_str(),
            actor = actor.email.as_str(),
            "Booking deleted"
        );
        Ok(())
    }

    /// Pending and confirmed bookings ending `today` or later, earliest
    /// first, without renter identities.
    pub async fn public_bookings(
        &self,
        vehicle_id: &str,
        today: NaiveDate,
    ) -> DomainResult<Vec<PublicBooking>> {
        let vehicle = self.vehicle(vehicle_id).await?;
        let mut visible: Vec<PublicBooking> = self
            .repos
            .bookings()
            .find_by_vehicle(&vehicle.id)
            .await?
            .iter()
            .filter(|b| b.status.is_publicly_visible() && b.period.end() >= today)
            .map(Booking::public_view)
            .collect();
        visible.sort_by_key(|b| b.start);
        Ok(visible)
    }

    pub async fn list_renter_bookings(
        &self,
        actor: &Actor,
        renter_email: &str,
    ) -> DomainResult<Vec<Booking>> {
        authorize(actor, Action::ViewOwn, Subject::Account(renter_email))?;
        self.repos.bookings().find_by_renter(renter_email).await
    }

    pub async fn list_vehicle_bookings(
        &self,
        actor: &Actor,
        vehicle_id: &str,
    ) -> DomainResult<Vec<Booking>> {
        let vehicle = self.vehicle(vehicle_id).await?;
        authorize(actor, Action::ViewVehicleBookings, Subject::Vehicle(&vehicle))?;
        self.repos.bookings().find_by_vehicle(&vehicle.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Availability, BookingStatus};
    use crate::infrastructure::database::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};
    use crate::infrastructure::storage::InMemoryStore;

    const OWNER: &str = "owner@x.com";

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn request(vehicle: &Vehicle, start: &str, end: &str) -> NewBooking {
        NewBooking {
            vehicle_id: vehicle.id.clone(),
            start: d(start),
            end: d(end),
            total_price: None,
        }
    }

    /// $50/day vehicle in a fresh store
    async fn setup() -> (BookingService, Arc<InMemoryStore>, Vehicle) {
        let store = Arc::new(InMemoryStore::new());
        let vehicle = Vehicle::new("Civic", 5_000, "Dhaka", OWNER, None).unwrap();
        store.vehicles().save(vehicle.clone()).await.unwrap();
        let service = BookingService::new(store.clone(), BookingRules::default());
        (service, store, vehicle)
    }

    async fn booking_count(store: &InMemoryStore, vehicle: &Vehicle) -> i64 {
        store
            .vehicles()
            .find_by_id(&vehicle.id)
            .await
            .unwrap()
            .unwrap()
            .booking_count
    }

    async fn assert_no_confirmed_overlap(store: &InMemoryStore, vehicle: &Vehicle) {
        let confirmed: Vec<Booking> = store
            .bookings()
            .find_by_vehicle(&vehicle.id)
            .await
            .unwrap()
            .into_iter()
            .filter(|b| b.status == BookingStatus::Confirmed)
            .collect();
        for (i, a) in confirmed.iter().enumerate() {
            for b in &confirmed[i + 1..] {
                assert!(
                    !a.period.overlaps(&b.period),
                    "{} overlaps {}",
                    a.period,
                    b.period
                );
            }
        }
    }

    #[tokio::test]
    async fn happy_path_scenario() {
        let (service, store, v) = setup().await;
        let owner = Actor::new(OWNER);
        let a = Actor::new("a@x.com");
        let b = Actor::new("b@x.com");

        let mut first = request(&v, "2025-06-01", "2025-06-03");
        first.total_price = Some(10_000);
        let first = service.create_booking(&a, first).await.unwrap();
        assert_eq!(first.status, BookingStatus::Pending);
        assert_eq!(first.total_price, 10_000);
        assert_eq!(booking_count(&store, &v).await, 1);

        let confirmed = service
            .update_booking_status(&owner, &first.id, "confirm")
            .await
            .unwrap();
        assert_eq!(confirmed.status, BookingStatus::Confirmed);

        let err = service
            .create_booking(&b, request(&v, "2025-06-02", "2025-06-04"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let second = service
            .create_booking(&b, request(&v, "2025-06-04", "2025-06-06"))
            .await
            .unwrap();
        assert_eq!(second.status, BookingStatus::Pending);
        assert_eq!(booking_count(&store, &v).await, 2);
    }

    #[tokio::test]
    async fn cancel_then_rebook_scenario() {
        let (service, _, v) = setup().await;
        let owner = Actor::new(OWNER);
        let a = Actor::new("a@x.com");
        let b = Actor::new("b@x.com");

        let first = service
            .create_booking(&a, request(&v, "2025-06-01", "2025-06-03"))
            .await
            .unwrap();
        service
            .update_booking_status(&owner, &first.id, "confirm")
            .await
            .unwrap();

        let canceled = service
            .update_booking_status(&a, &first.id, "cancel")
            .await
            .unwrap();
        assert_eq!(canceled.status, BookingStatus::Canceled);

        let rebooked = service
            .create_booking(&b, request(&v, "2025-06-01", "2025-06-03"))
            .await
            .unwrap();
        assert_eq!(rebooked.status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn create_rejections() {
        let (service, store, v) = setup().await;
        let a = Actor::new("a@x.com");

        let err = service
            .create_booking(&a, request(&v, "2025-06-03", "2025-06-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let mut wrong_total = request(&v, "2025-06-01", "2025-06-03");
        wrong_total.total_price = Some(1);
        let err = service.create_booking(&a, wrong_total).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = service
            .create_booking(&a, request(&v, "2025-06-01", "2025-07-15"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let mut missing = request(&v, "2025-06-01", "2025-06-03");
        missing.vehicle_id = "nope".into();
        let err = service.create_booking(&a, missing).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        let mut parked = v.clone();
        parked.availability = Availability::Unavailable;
        store.vehicles().update(parked).await.unwrap();
        let err = service
            .create_booking(&a, request(&v, "2025-06-01", "2025-06-03"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        assert_eq!(booking_count(&store, &v).await, 0);
    }

    #[tokio::test]
    async fn unknown_action_is_validation_error() {
        let (service, _, v) = setup().await;
        let a = Actor::new("a@x.com");
        let booking = service
            .create_booking(&a, request(&v, "2025-06-01", "2025-06-03"))
            .await
            .unwrap();

        let err = service
            .update_booking_status(&a, &booking.id, "complete")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn non_owner_confirm_is_always_forbidden() {
        let (service, store, v) = setup().await;
        let owner = Actor::new(OWNER);
        let a = Actor::new("a@x.com");
        let intruder = Actor::new("intruder@x.com");

        let pending = service
            .create_booking(&a, request(&v, "2025-06-01", "2025-06-03"))
            .await
            .unwrap();
        let confirmed = service
            .create_booking(&a, request(&v, "2025-06-10", "2025-06-12"))
            .await
            .unwrap();
        service
            .update_booking_status(&owner, &confirmed.id, "confirm")
            .await
            .unwrap();
        let canceled = service
            .create_booking(&a, request(&v, "2025-06-20", "2025-06-22"))
            .await
            .unwrap();
        service
            .update_booking_status(&a, &canceled.id, "cancel")
            .await
            .unwrap();

        for (id, expected) in [
            (&pending.id, BookingStatus::Pending),
            (&confirmed.id, BookingStatus::Confirmed),
            (&canceled.id, BookingStatus::Canceled),
        ] {
            for actor in [&a, &intruder] {
                let err = service
                    .update_booking_status(actor, id, "confirm")
                    .await
                    .unwrap_err();
                assert!(matches!(err, DomainError::Forbidden(_)));
            }
            let stored = store.bookings().find_by_id(id).await.unwrap().unwrap();
            assert_eq!(stored.status, expected);
        }
    }

    #[tokio::test]
    async fn only_renter_cancels_and_terminal_is_final() {
        let (service, _, v) = setup().await;
        let owner = Actor::new(OWNER);
        let a = Actor::new("a@x.com");

        let booking = service
            .create_booking(&a, request(&v, "2025-06-01", "2025-06-03"))
            .await
            .unwrap();
        let err = service
            .update_booking_status(&owner, &booking.id, "cancel")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        service
            .update_booking_status(&a, &booking.id, "cancel")
            .await
            .unwrap();
        let err = service
            .update_booking_status(&owner, &booking.id, "confirm")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        let err = service
            .update_booking_status(&a, &booking.id, "cancel")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn confirming_overlapping_pending_bookings() {
        let (service, store, v) = setup().await;
        let owner = Actor::new(OWNER);

        let first = service
            .create_booking(&Actor::new("a@x.com"), request(&v, "2025-06-01", "2025-06-05"))
            .await
            .unwrap();
        let second = service
            .create_booking(&Actor::new("b@x.com"), request(&v, "2025-06-03", "2025-06-07"))
            .await
            .unwrap();

        service
            .update_booking_status(&owner, &first.id, "confirm")
            .await
            .unwrap();
        let err = service
            .update_booking_status(&owner, &second.id, "confirm")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        assert_no_confirmed_overlap(&store, &v).await;
    }

    #[tokio::test]
    async fn concurrent_confirms_keep_dates_exclusive() {
        let (service, store, v) = setup().await;
        let service = Arc::new(service);

        let mut ids = Vec::new();
        for i in 0..8 {
            let renter = Actor::new(format!("r{}@x.com", i));
            let b = service
                .create_booking(&renter, request(&v, "2025-08-01", "2025-08-04"))
                .await
                .unwrap();
            ids.push(b.id);
        }

        let handles: Vec<_> = ids
            .into_iter()
            .map(|id| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .update_booking_status(&Actor::new(OWNER), &id, "confirm")
                        .await
                })
            })
            .collect();

        let mut confirmed = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => confirmed += 1,
                Err(e) => assert!(matches!(e, DomainError::Conflict(_))),
            }
        }
        assert_eq!(confirmed, 1);
        assert_no_confirmed_overlap(&store, &v).await;
    }

    #[tokio::test]
    async fn concurrent_writes_on_a_sqlite_file_all_land() {
        let path = std::env::temp_dir().join(format!("car-rental-{}.db", uuid::Uuid::new_v4()));
        let db = init_database(&DatabaseConfig {
            url: format!("sqlite://{}?mode=rwc", path.display()),
            max_connections: 10,
        })
        .await
        .unwrap();
        let store = Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
        let vehicle = Vehicle::new("Civic", 5_000, "Dhaka", OWNER, None).unwrap();
        store.vehicles().save(vehicle.clone()).await.unwrap();
        let service = Arc::new(BookingService::new(store.clone(), BookingRules::default()));

        // Pending bookings may share dates, so every create must succeed
        let creates: Vec<_> = (0..16)
            .map(|i| {
                let service = service.clone();
                let req = request(&vehicle, "2025-09-01", "2025-09-05");
                tokio::spawn(async move {
                    service
                        .create_booking(&Actor::new(format!("r{}@x.com", i)), req)
                        .await
                })
            })
            .collect();
        let mut ids = Vec::new();
        for handle in creates {
            ids.push(handle.await.unwrap().unwrap().id);
        }
        let stored = store.vehicles().find_by_id(&vehicle.id).await.unwrap().unwrap();
        assert_eq!(stored.booking_count, 16);

        let confirms: Vec<_> = ids
            .into_iter()
            .map(|id| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .update_booking_status(&Actor::new(OWNER), &id, "confirm")
                        .await
                })
            })
            .collect();
        let mut confirmed = 0;
        for handle in confirms {
            match handle.await.unwrap() {
                Ok(_) => confirmed += 1,
                Err(e) => assert!(matches!(e, DomainError::Conflict(_)), "{}", e),
            }
        }
        assert_eq!(confirmed, 1);
        let stored_confirmed = store
            .bookings()
            .find_by_vehicle(&vehicle.id)
            .await
            .unwrap()
            .into_iter()
            .filter(|b| b.status == BookingStatus::Confirmed)
            .count();
        assert_eq!(stored_confirmed, 1);

        db.close().await.unwrap();
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn edit_rules() {
        let (service, store, v) = setup().await;
        let owner = Actor::new(OWNER);
        let a = Actor::new("a@x.com");
        let b = Actor::new("b@x.com");

        let mine = service
            .create_booking(&a, request(&v, "2025-06-01", "2025-06-03"))
            .await
            .unwrap();
        let theirs = service
            .create_booking(&b, request(&v, "2025-06-10", "2025-06-12"))
            .await
            .unwrap();
        service
            .update_booking_status(&owner, &mine.id, "confirm")
            .await
            .unwrap();
        service
            .update_booking_status(&owner, &theirs.id, "confirm")
            .await
            .unwrap();

        let change = |start: &str, end: &str| BookingChange {
            start: d(start),
            end: d(end),
            total_price: None,
        };

        let err = service
            .update_booking(&owner, &mine.id, change("2025-06-01", "2025-06-04"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        // Overlapping its own old dates is fine
        let moved = service
            .update_booking(&a, &mine.id, change("2025-06-02", "2025-06-05"))
            .await
            .unwrap();
        assert_eq!(moved.total_price, 15_000);
        assert_eq!(moved.status, BookingStatus::Confirmed);

        let err = service
            .update_booking(&a, &mine.id, change("2025-06-08", "2025-06-10"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        service
            .update_booking_status(&a, &mine.id, "cancel")
            .await
            .unwrap();
        let err = service
            .update_booking(&a, &mine.id, change("2025-07-01", "2025-07-02"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        assert_eq!(booking_count(&store, &v).await, 2);
        assert_no_confirmed_overlap(&store, &v).await;
    }

    #[tokio::test]
    async fn booking_count_tracks_creates_minus_live_deletes() {
        let (service, store, v) = setup().await;
        let owner = Actor::new(OWNER);
        let a = Actor::new("a@x.com");

        let mut created = Vec::new();
        for (start, end) in [
            ("2025-06-01", "2025-06-02"),
            ("2025-06-05", "2025-06-06"),
            ("2025-06-10", "2025-06-11"),
            ("2025-06-15", "2025-06-16"),
        ] {
            created.push(service.create_booking(&a, request(&v, start, end)).await.unwrap());
        }
        service
            .update_booking_status(&owner, &created[0].id, "confirm")
            .await
            .unwrap();
        service
            .update_booking_status(&a, &created[1].id, "cancel")
            .await
            .unwrap();
        assert_eq!(booking_count(&store, &v).await, 4);

        // confirmed (owner deletes) and pending (renter deletes) both release
        service.delete_booking(&owner, &created[0].id).await.unwrap();
        service.delete_booking(&a, &created[2].id).await.unwrap();
        assert_eq!(booking_count(&store, &v).await, 2);

        // canceled bookings leave the counter alone
        service.delete_booking(&a, &created[1].id).await.unwrap();
        assert_eq!(booking_count(&store, &v).await, 2);

        let err = service
            .delete_booking(&Actor::new("x@x.com"), &created[3].id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        let err = service.delete_booking(&a, &created[0].id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn public_view_hides_renters_and_past_bookings() {
        let (service, _, v) = setup().await;
        let owner = Actor::new(OWNER);
        let a = Actor::new("a@x.com");

        service
            .create_booking(&a, request(&v, "2025-05-01", "2025-05-03"))
            .await
            .unwrap();
        let upcoming = service
            .create_booking(&a, request(&v, "2025-06-10", "2025-06-12"))
            .await
            .unwrap();
        let ending_today = service
            .create_booking(&a, request(&v, "2025-05-30", "2025-06-01"))
            .await
            .unwrap();
        let canceled = service
            .create_booking(&a, request(&v, "2025-06-20", "2025-06-22"))
            .await
            .unwrap();
        service
            .update_booking_status(&owner, &upcoming.id, "confirm")
            .await
            .unwrap();
        service
            .update_booking_status(&a, &canceled.id, "cancel")
            .await
            .unwrap();

        let visible = service
            .public_bookings(&v.id, d("2025-06-01"))
            .await
            .unwrap();
        assert_eq!(
            visible,
            vec![
                ending_today.public_view(),
                PublicBooking {
                    start: d("2025-06-10"),
                    end: d("2025-06-12"),
                    status: BookingStatus::Confirmed,
                },
            ]
        );

        let err = service
            .public_bookings("nope", d("2025-06-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn listings_are_scoped_to_their_owner() {
        let (service, _, v) = setup().await;
        let owner = Actor::new(OWNER);
        let a = Actor::new("a@x.com");
        service
            .create_booking(&a, request(&v, "2025-06-01", "2025-06-03"))
            .await
            .unwrap();

        assert_eq!(service.list_renter_bookings(&a, "a@x.com").await.unwrap().len(), 1);
        let err = service
            .list_renter_bookings(&owner, "a@x.com")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        assert_eq!(service.list_vehicle_bookings(&owner, &v.id).await.unwrap().len(), 1);
        let err = service.list_vehicle_bookings(&a, &v.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }
}
