//! Review DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{RatingSummary, Review};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReviewResponse {
    pub id: String,
    pub vehicle_id: String,
    pub booking_id: String,
    pub vehicle_model: String,
    pub owner_email: String,
    pub owner_name: Option<String>,
    pub reviewer_email: String,
    pub reviewer_name: Option<String>,
    pub reviewer_photo: Option<String>,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(r: Review) -> Self {
        Self {
            id: r.id,
            vehicle_id: r.vehicle_id,
            booking_id: r.booking_id,
            vehicle_model: r.vehicle_model,
            owner_email: r.owner_email,
            owner_name: r.owner_name,
            reviewer_email: r.reviewer_email,
            reviewer_name: r.reviewer_name,
            reviewer_photo: r.reviewer_photo,
            rating: r.rating,
            comment: r.comment,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Vehicle rating after the change, rounded to one decimal
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RatingSummaryResponse {
    pub rating: f64,
    pub review_count: i64,
}

impl From<RatingSummary> for RatingSummaryResponse {
    fn from(s: RatingSummary) -> Self {
        Self {
            rating: s.rating,
            review_count: s.review_count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReviewWithRatingResponse {
    pub review: ReviewResponse,
    /// Absent when an update left the rating untouched
    pub vehicle_rating: Option<RatingSummaryResponse>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReviewRequest {
    #[validate(length(min = 1, message = "vehicle_id is required"))]
    pub vehicle_id: String,
    #[validate(length(min = 1, message = "booking_id is required"))]
    pub booking_id: String,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i32,
    #[validate(length(min = 10, max = 1000, message = "comment must be 10 to 1000 characters"))]
    pub comment: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateReviewRequest {
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: Option<i32>,
    #[validate(length(min = 10, max = 1000, message = "comment must be 10 to 1000 characters"))]
    pub comment: Option<String>,
}
