//! Review repository interface
//!
//! Mutations recompute the vehicle's rating in the same transaction as the
//! review write and return the summary that was stored.

use async_trait::async_trait;

use super::model::{RatingSummary, Review};
use crate::domain::DomainResult;

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Review>>;

    /// Every review, newest first
    async fn find_all(&self) -> DomainResult<Vec<Review>>;

    /// Reviews of a vehicle, newest first
    async fn find_by_vehicle(&self, vehicle_id: &str) -> DomainResult<Vec<Review>>;

    /// Reviews written by a reviewer, newest first
    async fn find_by_reviewer(&self, reviewer_email: &str) -> DomainResult<Vec<Review>>;

    async fn find_by_vehicle_and_reviewer(
        &self,
        vehicle_id: &str,
        reviewer_email: &str,
    ) -> DomainResult<Option<Review>>;

    /// Insert a review. `Conflict` if the reviewer already reviewed the vehicle.
    async fn insert_and_recompute(&self, review: Review) -> DomainResult<RatingSummary>;

    /// Change rating and/or comment. The summary is `Some` only when the
    /// rating was part of the update.
    async fn update_and_recompute(
        &self,
        id: &str,
        rating: Option<i32>,
        comment: Option<String>,
    ) -> DomainResult<(Review, Option<RatingSummary>)>;

    /// Remove a review and return the vehicle's new summary
    async fn delete_and_recompute(&self, id: &str) -> DomainResult<RatingSummary>;

    /// Re-average every review of a vehicle and store the result
    async fn recompute(&self, vehicle_id: &str) -> DomainResult<RatingSummary>;
}
