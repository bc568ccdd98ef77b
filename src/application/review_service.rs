//! Review aggregator: review mutations and vehicle rating recomputation

use std::sync::Arc;

use tracing::info;

use crate::domain::review::model::{validate_comment, validate_rating};
use crate::domain::review::{Reviewer, VehicleSnapshot};
use crate::domain::{
    authorize, Action, Actor, DomainError, DomainResult, RatingSummary, RepositoryProvider,
    Review, Subject, Vehicle,
};
use crate::shared::{retry_with_backoff, RetryConfig};

#[derive(Debug, Clone)]
pub struct NewReview {
    pub vehicle_id: String,
    pub booking_id: String,
    pub rating: i32,
    pub comment: String,
}

pub struct ReviewService {
    repos: Arc<dyn RepositoryProvider>,
    retry: RetryConfig,
}

impl ReviewService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, retry: RetryConfig) -> Self {
        Self { repos, retry }
    }

    async fn vehicle(&self, id: &str) -> DomainResult<Vehicle> {
        self.repos
            .vehicles()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Vehicle", id))
    }

    async fn review(&self, id: &str) -> DomainResult<Review> {
        self.repos
            .reviews()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Review", id))
    }

    /// Write a review for a confirmed or completed booking of the actor's
    /// and return it with the vehicle's recomputed rating.
    pub async fn create_review(
        &self,
        actor: &Actor,
        req: NewReview,
    ) -> DomainResult<(Review, RatingSummary)> {
        let vehicle = self.vehicle(&req.vehicle_id).await?;
        let booking = self
            .repos
            .bookings()
            .find_by_id(&req.booking_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Booking", req.booking_id.clone()))?;
        if booking.vehicle_id != vehicle.id {
            return Err(DomainError::Validation(format!(
                "booking {} is not for vehicle {}",
                booking.id, vehicle.id
            )));
        }
        authorize(
            actor,
            Action::CreateReview,
            Subject::Booking {
                booking: &booking,
                vehicle_owner: &vehicle.owner_email,
            },
        )?;

        let review = Review::new(
            VehicleSnapshot {
                vehicle_id: vehicle.id.clone(),
                model: vehicle.model.clone(),
                owner_email: vehicle.owner_email.clone(),
                owner_name: vehicle.owner_name.clone(),
            },
            &booking.id,
            Reviewer {
                email: actor.email.clone(),
                name: actor.name.clone(),
                photo_url: actor.photo_url.clone(),
            },
            req.rating,
            req.comment,
        )?;

        if self
            .repos
            .reviews()
            .find_by_vehicle_and_reviewer(&vehicle.id, &actor.email)
            .await?
            .is_some()
        {
            return Err(DomainError::Conflict(format!(
                "{} has already reviewed vehicle {}",
                actor.email, vehicle.id
            )));
        }

        let summary = retry_with_backoff(
            self.retry.clone(),
            || self.repos.reviews().insert_and_recompute(review.clone()),
            DomainError::is_transient,
            "create_review",
        )
        .await?;

        metrics::counter!("reviews_total", "op" => "create").increment(1);
        info!(
            review_id = review.id.as_str(),
            vehicle_id = review.vehicle_id.as_str(),
            rating = review.rating,
            vehicle_rating = summary.rating,
            review_count = summary.review_count,
            "Review created"
        );
        Ok((review, summary))
    }

    /// Reviewer-only edit. The summary is present when the rating changed.
    pub async fn update_review(
        &self,
        actor: &Actor,
        review_id: &str,
        rating: Option<i32>,
        comment: Option<String>,
    ) -> DomainResult<(Review, Option<RatingSummary>)> {
        if rating.is_none() && comment.is_none() {
            return Err(DomainError::Validation(
                "nothing to update: provide a rating or a comment".into(),
            ));
        }
        if let Some(rating) = rating {
            validate_rating(rating)?;
        }
        if let Some(comment) = &comment {
            validate_comment(comment)?;
        }

        let review = self.review(review_id).await?;
        authorize(actor, Action::UpdateReview, Subject::Review(&review))?;

        let (updated, summary) = retry_with_backoff(
            self.retry.clone(),
            || {
                self.repos
                    .reviews()
                    .update_and_recompute(&review.id, rating, comment.clone())
            },
            DomainError::is_transient,
            "update_review",
        )
        .await?;

        metrics::counter!("reviews_total", "op" => "update").increment(1);
        info!(
            review_id = updated.id.as_str(),
            rating = updated.rating,
            recomputed = summary.is_some(),
            "Review updated"
        );
        Ok((updated, summary))
    }

    /// Reviewer or vehicle owner may delete
    pub async fn delete_review(&self, actor: &Actor, review_id: &str) -> DomainResult<RatingSummary> {
        let review = self.review(review_id).await?;
        authorize(actor, Action::DeleteReview, Subject::Review(&review))?;

        let summary = retry_with_backoff(
            self.retry.clone(),
            || self.repos.reviews().delete_and_recompute(&review.id),
            DomainError::is_transient,
            "delete_review",
        )
        .await?;

        metrics::counter!("reviews_total", "op" => "delete").increment(1);
        info!(
            review_id = review.id.as_str(),
            vehicle_id = review.vehicle_id.as_str(),
            actor = actor.email.as_str(),
            "Review deleted"
        );
        Ok(summary)
    }

    /// Re-average every review of the vehicle and store the result
    pub async fn recompute_vehicle_rating(&self, vehicle_id: &str) -> DomainResult<RatingSummary> {
        retry_with_backoff(
            self.retry.clone(),
            || self.repos.reviews().recompute(vehicle_id),
            DomainError::is_transient,
            "recompute_vehicle_rating",
        )
        .await
    }

    /// Every review across all vehicles, newest first
    pub async fn list_all(&self) -> DomainResult<Vec<Review>> {
        self.repos.reviews().find_all().await
    }

    pub async fn list_vehicle_reviews(&self, vehicle_id: &str) -> DomainResult<Vec<Review>> {
        let vehicle = self.vehicle(vehicle_id).await?;
        self.repos.reviews().find_by_vehicle(&vehicle.id).await
    }

    pub async fn list_reviewer_reviews(
        &self,
        actor: &Actor,
        reviewer_email: &str,
    ) -> DomainResult<Vec<Review>> {
        authorize(actor, Action::ViewOwn, Subject::Account(reviewer_email))?;
        self.repos.reviews().find_by_reviewer(reviewer_email).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::booking_service::{BookingRules, BookingService, NewBooking};
    use crate::domain::Booking;
    use crate::infrastructure::storage::InMemoryStore;

    const OWNER: &str = "owner@x.com";

    struct Fixture {
        store: Arc<InMemoryStore>,
        bookings: BookingService,
        reviews: ReviewService,
        vehicle: Vehicle,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let vehicle = Vehicle::new("Civic", 5_000, "Dhaka", OWNER, Some("Karim".into())).unwrap();
        store.vehicles().save(vehicle.clone()).await.unwrap();
        Fixture {
            bookings: BookingService::new(store.clone(), BookingRules::default()),
            reviews: ReviewService::new(store.clone(), RetryConfig::default()),
            store,
            vehicle,
        }
    }

    impl Fixture {
        async fn booking(&self, renter: &Actor, start: &str, end: &str, confirm: bool) -> Booking {
            let booking = self
                .bookings
                .create_booking(
                    renter,
                    NewBooking {
                        vehicle_id: self.vehicle.id.clone(),
                        start: start.parse().unwrap(),
                        end: end.parse().unwrap(),
                        total_price: None,
                    },
                )
                .await
                .unwrap();
            if !confirm {
                return booking;
            }
            self.bookings
                .update_booking_status(&Actor::new(OWNER), &booking.id, "confirm")
                .await
                .unwrap()
        }

        fn request(&self, booking: &Booking, rating: i32) -> NewReview {
            NewReview {
                vehicle_id: self.vehicle.id.clone(),
                booking_id: booking.id.clone(),
                rating,
                comment: "clean car and easy pickup".into(),
            }
        }

        async fn stored_summary(&self) -> (f64, i64) {
            let v = self
                .store
                .vehicles()
                .find_by_id(&self.vehicle.id)
                .await
                .unwrap()
                .unwrap();
            (v.rating, v.review_count)
        }
    }

    #[tokio::test]
    async fn review_lifecycle_scenario() {
        let f = fixture().await;
        let a = Actor::new("a@x.com");
        let b = Actor::new("b@x.com");

        let a_booking = f.booking(&a, "2025-06-01", "2025-06-03", true).await;
        let (review, summary) = f
            .reviews
            .create_review(&a, f.request(&a_booking, 4))
            .await
            .unwrap();
        assert_eq!(summary, RatingSummary { rating: 4.0, review_count: 1 });
        assert_eq!(review.vehicle_model, "Civic");
        assert_eq!(review.owner_name.as_deref(), Some("Karim"));

        let err = f
            .reviews
            .create_review(&a, f.request(&a_booking, 5))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(f.stored_summary().await, (4.0, 1));

        let b_booking = f.booking(&b, "2025-06-10", "2025-06-12", true).await;
        let (_, summary) = f
            .reviews
            .create_review(&b, f.request(&b_booking, 2))
            .await
            .unwrap();
        assert_eq!(summary, RatingSummary { rating: 3.0, review_count: 2 });
        assert_eq!(f.stored_summary().await, (3.0, 2));

        let everything = f.reviews.list_all().await.unwrap();
        assert_eq!(everything.len(), 2);
        assert!(everything.iter().any(|r| r.id == review.id));
    }

    #[tokio::test]
    async fn only_the_renter_of_a_reviewable_booking_may_review() {
        let f = fixture().await;
        let a = Actor::new("a@x.com");

        let pending = f.booking(&a, "2025-06-01", "2025-06-03", false).await;
        let err = f
            .reviews
            .create_review(&a, f.request(&pending, 5))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let confirmed = f.booking(&a, "2025-06-10", "2025-06-12", true).await;
        let err = f
            .reviews
            .create_review(&Actor::new("b@x.com"), f.request(&confirmed, 5))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let mut bad = f.request(&confirmed, 6);
        let err = f.reviews.create_review(&a, bad.clone()).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        bad.rating = 5;
        bad.vehicle_id = "elsewhere".into();
        let err = f.reviews.create_review(&a, bad).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        assert_eq!(f.stored_summary().await, (0.0, 0));
    }

    #[tokio::test]
    async fn booking_must_belong_to_vehicle() {
        let f = fixture().await;
        let a = Actor::new("a@x.com");
        let other = Vehicle::new("Aqua", 4_000, "Dhaka", OWNER, None).unwrap();
        f.store.vehicles().save(other.clone()).await.unwrap();

        let booking = f.booking(&a, "2025-06-01", "2025-06-03", true).await;
        let mut req = f.request(&booking, 5);
        req.vehicle_id = other.id.clone();
        let err = f.reviews.create_review(&a, req).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn update_and_delete_recompute() {
        let f = fixture().await;
        let a = Actor::new("a@x.com");
        let b = Actor::new("b@x.com");
        let owner = Actor::new(OWNER);

        let a_booking = f.booking(&a, "2025-06-01", "2025-06-03", true).await;
        let b_booking = f.booking(&b, "2025-06-10", "2025-06-12", true).await;
        let (a_review, _) = f.reviews.create_review(&a, f.request(&a_booking, 5)).await.unwrap();
        let (b_review, _) = f.reviews.create_review(&b, f.request(&b_booking, 4)).await.unwrap();
        assert_eq!(f.stored_summary().await, (4.5, 2));

        let err = f
            .reviews
            .update_review(&owner, &a_review.id, Some(1), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let (_, summary) = f
            .reviews
            .update_review(&a, &a_review.id, None, Some("changed my mind about it".into()))
            .await
            .unwrap();
        assert!(summary.is_none());

        let (updated, summary) = f
            .reviews
            .update_review(&a, &a_review.id, Some(1), None)
            .await
            .unwrap();
        assert_eq!(updated.rating, 1);
        assert_eq!(updated.comment, "changed my mind about it");
        assert_eq!(summary.unwrap().rating, 2.5);

        let err = f
            .reviews
            .delete_review(&Actor::new("x@x.com"), &b_review.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        // vehicle owner can moderate
        let summary = f.reviews.delete_review(&owner, &b_review.id).await.unwrap();
        assert_eq!(summary, RatingSummary { rating: 1.0, review_count: 1 });

        let summary = f.reviews.delete_review(&a, &a_review.id).await.unwrap();
        assert_eq!(summary, RatingSummary::EMPTY);
        assert_eq!(f.stored_summary().await, (0.0, 0));
        assert!(f.reviews.list_vehicle_reviews(&f.vehicle.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_update_is_rejected() {
        let f = fixture().await;
        let err = f
            .reviews
            .update_review(&Actor::new("a@x.com"), "r-1", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn recompute_matches_persisted_reviews() {
        let f = fixture().await;
        let a = Actor::new("a@x.com");
        let booking = f.booking(&a, "2025-06-01", "2025-06-03", true).await;
        f.reviews.create_review(&a, f.request(&booking, 3)).await.unwrap();

        let summary = f.reviews.recompute_vehicle_rating(&f.vehicle.id).await.unwrap();
        let persisted = f.reviews.list_vehicle_reviews(&f.vehicle.id).await.unwrap();
        assert_eq!(summary.review_count, persisted.len() as i64);
        assert_eq!(summary.rating, 3.0);

        assert_eq!(f.reviews.list_reviewer_reviews(&a, "a@x.com").await.unwrap().len(), 1);
        let err = f
            .reviews
            .list_reviewer_reviews(&a, OWNER)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let err = f.reviews.recompute_vehicle_rating("nope").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
