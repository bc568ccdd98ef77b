//! In-memory storage implementation
//!
//! Backs the `memory://` database URL and the service tests. Compound writes
//! serialize on a single async gate so that check-then-write sequences are
//! atomic; reads go straight to the maps.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::domain::booking::{Booking, BookingRepository, BookingStatus, DateRange};
use crate::domain::review::{RatingSummary, Review, ReviewRepository};
use crate::domain::vehicle::{Vehicle, VehicleRepository};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};

/// In-memory storage for development and testing
pub struct InMemoryStore {
    vehicles: DashMap<String, Vehicle>,
    bookings: DashMap<String, Booking>,
    reviews: DashMap<String, Review>,
    write_gate: Mutex<()>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            vehicles: DashMap::new(),
            bookings: DashMap::new(),
            reviews: DashMap::new(),
            write_gate: Mutex::new(()),
        }
    }

    fn confirmed_overlapping(
        &self,
        vehicle_id: &str,
        period: &DateRange,
        exclude_id: Option<&str>,
    ) -> Vec<Booking> {
        self.bookings
            .iter()
            .filter(|b| b.vehicle_id == vehicle_id)
            .filter(|b| Some(b.id.as_str()) != exclude_id)
            .filter(|b| b.blocks(period))
            .map(|b| b.clone())
            .collect()
    }

    fn bump_booking_count(&self, vehicle_id: &str, delta: i64) {
        if let Some(mut v) = self.vehicles.get_mut(vehicle_id) {
            v.booking_count += delta;
        }
    }

    fn write_rating(&self, vehicle_id: &str) -> RatingSummary {
        let ratings: Vec<i32> = self
            .reviews
            .iter()
            .filter(|r| r.vehicle_id == vehicle_id)
            .map(|r| r.rating)
            .collect();
        let summary = RatingSummary::from_ratings(&ratings);
        if let Some(mut v) = self.vehicles.get_mut(vehicle_id) {
            v.rating = summary.rating;
            v.review_count = summary.review_count;
        }
        summary
    }

    fn booking_snapshot(&self, id: &str) -> DomainResult<Booking> {
        self.bookings
            .get(id)
            .map(|b| b.clone())
            .ok_or_else(|| DomainError::not_found("Booking", id))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn newest_first<T>(mut items: Vec<T>, created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    items.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
    items
}

// ── VehicleRepository ───────────────────────────────────────────

#[async_trait]
impl VehicleRepository for InMemoryStore {
    async fn save(&self, vehicle: Vehicle) -> DomainResult<()> {
        if self.vehicles.contains_key(&vehicle.id) {
            return Err(DomainError::Conflict(format!(
                "vehicle {} already exists",
                vehicle.id
            )));
        }
        self.vehicles.insert(vehicle.id.clone(), vehicle);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Vehicle>> {
        Ok(self.vehicles.get(id).map(|v| v.clone()))
    }

    async fn find_all(&self) -> DomainResult<Vec<Vehicle>> {
        let all: Vec<Vehicle> = self.vehicles.iter().map(|v| v.clone()).collect();
        Ok(newest_first(all, |v| v.created_at))
    }

    async fn find_by_owner(&self, owner_email: &str) -> DomainResult<Vec<Vehicle>> {
        let owned: Vec<Vehicle> = self
            .vehicles
            .iter()
            .filter(|v| v.owner_email == owner_email)
            .map(|v| v.clone())
            .collect();
        Ok(newest_first(owned, |v| v.created_at))
    }

    async fn update(&self, vehicle: Vehicle) -> DomainResult<()> {
        let _gate = self.write_gate.lock().await;
        let mut stored = self
            .vehicles
            .get_mut(&vehicle.id)
            .ok_or_else(|| DomainError::not_found("Vehicle", vehicle.id.clone()))?;
        stored.model = vehicle.model;
        stored.daily_price = vehicle.daily_price;
        stored.location = vehicle.location;
        stored.availability = vehicle.availability;
        stored.registration = vehicle.registration;
        stored.description = vehicle.description;
        stored.features = vehicle.features;
        stored.image_urls = vehicle.image_urls;
        stored.updated_at = vehicle.updated_at;
        Ok(())
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let _gate = self.write_gate.lock().await;
        if self.vehicles.remove(id).is_none() {
            return Err(DomainError::not_found("Vehicle", id));
        }
        self.bookings.retain(|_, b| b.vehicle_id != id);
        self.reviews.retain(|_, r| r.vehicle_id != id);
        Ok(())
    }
}

// ── BookingRepository ───────────────────────────────────────────

#[async_trait]
impl BookingRepository for InMemoryStore {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Booking>> {
        Ok(self.bookings.get(id).map(|b| b.clone()))
    }

    async fn find_by_vehicle(&self, vehicle_id: &str) -> DomainResult<Vec<Booking>> {
        let found: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|b| b.vehicle_id == vehicle_id)
            .map(|b| b.clone())
            .collect();
        Ok(newest_first(found, |b| b.created_at))
    }

    async fn find_by_renter(&self, renter_email: &str) -> DomainResult<Vec<Booking>> {
        let found: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|b| b.renter_email == renter_email)
            .map(|b| b.clone())
            .collect();
        Ok(newest_first(found, |b| b.created_at))
    }

    async fn find_confirmed_overlapping(
        &self,
        vehicle_id: &str,
        period: &DateRange,
        exclude_id: Option<&str>,
    ) -> DomainResult<Vec<Booking>> {
        Ok(self.confirmed_overlapping(vehicle_id, period, exclude_id))
    }

    async fn insert_reserving(&self, booking: Booking) -> DomainResult<Booking> {
        let _gate = self.write_gate.lock().await;

        let available = self
            .vehicles
            .get(&booking.vehicle_id)
            .map(|v| v.is_available())
            .ok_or_else(|| DomainError::not_found("Vehicle", booking.vehicle_id.clone()))?;
        if !available {
            return Err(DomainError::Conflict(format!(
                "vehicle {} is not available",
                booking.vehicle_id
            )));
        }
        if !self
            .confirmed_overlapping(&booking.vehicle_id, &booking.period, None)
            .is_empty()
        {
            return Err(DomainError::Conflict(format!(
                "vehicle {} is already booked for {}",
                booking.vehicle_id, booking.period
            )));
        }

        self.bookings.insert(booking.id.clone(), booking.clone());
        self.bump_booking_count(&booking.vehicle_id, 1);
        Ok(booking)
    }

    async fn reschedule(
        &self,
        id: &str,
        period: DateRange,
        total_price: i64,
        updated_at: DateTime<Utc>,
    ) -> DomainResult<Booking> {
        let _gate = self.write_gate.lock().await;

        let mut booking = self.booking_snapshot(id)?;
        if booking.status.is_terminal() {
            return Err(DomainError::Conflict(format!(
                "booking {} is {} and can no longer be edited",
                id, booking.status
            )));
        }
        if !self
            .confirmed_overlapping(&booking.vehicle_id, &period, Some(id))
            .is_empty()
        {
            return Err(DomainError::Conflict(format!(
                "vehicle {} is already booked for {}",
                booking.vehicle_id, period
            )));
        }

        booking.period = period;
        booking.total_price = total_price;
        booking.updated_at = updated_at;
        self.bookings.insert(booking.id.clone(), booking.clone());
        Ok(booking)
    }

    async fn set_status(
        &self,
        id: &str,
        from: BookingStatus,
        to: BookingStatus,
        updated_at: DateTime<Utc>,
    ) -> DomainResult<Booking> {
        let _gate = self.write_gate.lock().await;

        let mut booking = self.booking_snapshot(id)?;
        if booking.status != from {
            return Err(DomainError::Conflict(format!(
                "booking {} changed concurrently (now {})",
                id, booking.status
            )));
        }
        if to.blocks_dates()
            && !self
                .confirmed_overlapping(&booking.vehicle_id, &booking.period, Some(id))
                .is_empty()
        {
            return Err(DomainError::Conflict(format!(
                "vehicle {} already has a confirmed booking overlapping {}",
                booking.vehicle_id, booking.period
            )));
        }

        booking.status = to;
        booking.updated_at = updated_at;
        self.bookings.insert(booking.id.clone(), booking.clone());
        Ok(booking)
    }

    async fn delete_releasing(&self, id: &str) -> DomainResult<Booking> {
        let _gate = self.write_gate.lock().await;

        let (_, booking) = self
            .bookings
            .remove(id)
            .ok_or_else(|| DomainError::not_found("Booking", id))?;
        if booking.status != BookingStatus::Canceled {
            self.bump_booking_count(&booking.vehicle_id, -1);
        }
        Ok(booking)
    }
}

// ── ReviewRepository ────────────────────────────────────────────

#[async_trait]
impl ReviewRepository for InMemoryStore {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Review>> {
        Ok(self.reviews.get(id).map(|r| r.clone()))
    }

    async fn find_all(&self) -> DomainResult<Vec<Review>> {
        let all: Vec<Review> = self.reviews.iter().map(|r| r.clone()).collect();
        Ok(newest_first(all, |r| r.created_at))
    }

    async fn find_by_vehicle(&self, vehicle_id: &str) -> DomainResult<Vec<Review>> {
        let found: Vec<Review> = self
            .reviews
            .iter()
            .filter(|r| r.vehicle_id == vehicle_id)
            .map(|r| r.clone())
            .collect();
        Ok(newest_first(found, |r| r.created_at))
    }

    async fn find_by_reviewer(&self, reviewer_email: &str) -> DomainResult<Vec<Review>> {
        let found: Vec<Review> = self
            .reviews
            .iter()
            .filter(|r| r.reviewer_email == reviewer_email)
            .map(|r| r.clone())
            .collect();
        Ok(newest_first(found, |r| r.created_at))
    }

    async fn find_by_vehicle_and_reviewer(
        &self,
        vehicle_id: &str,
        reviewer_email: &str,
    ) -> DomainResult<Option<Review>> {
        Ok(self
            .reviews
            .iter()
            .find(|r| r.vehicle_id == vehicle_id && r.reviewer_email == reviewer_email)
            .map(|r| r.clone()))
    }

    async fn insert_and_recompute(&self, review: Review) -> DomainResult<RatingSummary> {
        let _gate = self.write_gate.lock().await;

        if !self.vehicles.contains_key(&review.vehicle_id) {
            return Err(DomainError::not_found("Vehicle", review.vehicle_id.clone()));
        }
        let duplicate = self.reviews.iter().any(|r| {
            r.vehicle_id == review.vehicle_id && r.reviewer_email == review.reviewer_email
        });
        if duplicate {
            return Err(DomainError::Conflict(format!(
                "{} has already reviewed vehicle {}",
                review.reviewer_email, review.vehicle_id
            )));
        }

        let vehicle_id = review.vehicle_id.clone();
        self.reviews.insert(review.id.clone(), review);
        Ok(self.write_rating(&vehicle_id))
    }

    async fn update_and_recompute(
        &self,
        id: &str,
        rating: Option<i32>,
        comment: Option<String>,
    ) -> DomainResult<(Review, Option<RatingSummary>)> {
        let _gate = self.write_gate.lock().await;

        let updated = {
            let mut review = self
                .reviews
                .get_mut(id)
                .ok_or_else(|| DomainError::not_found("Review", id))?;
            if let Some(rating) = rating {
                review.rating = rating;
            }
            if let Some(comment) = comment {
                review.comment = comment;
            }
            review.updated_at = Utc::now();
            review.clone()
        };

        let summary = rating.map(|_| self.write_rating(&updated.vehicle_id));
        Ok((updated, summary))
    }

    async fn delete_and_recompute(&self, id: &str) -> DomainResult<RatingSummary> {
        let _gate = self.write_gate.lock().await;

        let (_, review) = self
            .reviews
            .remove(id)
            .ok_or_else(|| DomainError::not_found("Review", id))?;
        Ok(self.write_rating(&review.vehicle_id))
    }

    async fn recompute(&self, vehicle_id: &str) -> DomainResult<RatingSummary> {
        let _gate = self.write_gate.lock().await;

        if !self.vehicles.contains_key(vehicle_id) {
            return Err(DomainError::not_found("Vehicle", vehicle_id));
        }
        Ok(self.write_rating(vehicle_id))
    }
}

#[async_trait]
impl RepositoryProvider for InMemoryStore {
    fn vehicles(&self) -> &dyn VehicleRepository {
        self
    }

    fn bookings(&self) -> &dyn BookingRepository {
        self
    }

    fn reviews(&self) -> &dyn ReviewRepository {
        self
    }

    async fn ping(&self) -> DomainResult<()> {
        Ok(())
    }
}
