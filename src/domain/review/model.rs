//! Review domain entity and rating aggregation

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{DomainError, DomainResult};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;
pub const MIN_COMMENT_CHARS: usize = 10;
pub const MAX_COMMENT_CHARS: usize = 1000;

/// Post-rental review.
///
/// `vehicle_model`, `owner_email` and `owner_name` are a snapshot taken when
/// the review is written; they are not refreshed when the listing changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
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

/// Identity of the person writing a review
#[derive(Debug, Clone)]
pub struct Reviewer {
    pub email: String,
    pub name: Option<String>,
    pub photo_url: Option<String>,
}

/// Vehicle fields copied onto the review
#[derive(Debug, Clone)]
pub struct VehicleSnapshot {
    pub vehicle_id: String,
    pub model: String,
    pub owner_email: String,
    pub owner_name: Option<String>,
}

impl Review {
    pub fn new(
        vehicle: VehicleSnapshot,
        booking_id: impl Into<String>,
        reviewer: Reviewer,
        rating: i32,
        comment: impl Into<String>,
    ) -> DomainResult<Self> {
        let comment = comment.into();
        validate_rating(rating)?;
        validate_comment(&comment)?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            vehicle_id: vehicle.vehicle_id,
            booking_id: booking_id.into(),
            vehicle_model: vehicle.model,
            owner_email: vehicle.owner_email,
            owner_name: vehicle.owner_name,
            reviewer_email: reviewer.email,
            reviewer_name: reviewer.name,
            reviewer_photo: reviewer.photo_url,
            rating,
            comment,
            created_at: now,
            updated_at: now,
        })
    }
}

pub fn validate_rating(rating: i32) -> DomainResult<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(DomainError::Validation(format!(
            "rating must be between {} and {}, got {}",
            MIN_RATING, MAX_RATING, rating
        )));
    }
    Ok(())
}

pub fn validate_comment(comment: &str) -> DomainResult<()> {
    let len = comment.chars().count();
    if !(MIN_COMMENT_CHARS..=MAX_COMMENT_CHARS).contains(&len) {
        return Err(DomainError::Validation(format!(
            "comment must be {}-{} characters, got {}",
            MIN_COMMENT_CHARS, MAX_COMMENT_CHARS, len
        )));
    }
    Ok(())
}

/// Aggregate rating written back to the vehicle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    pub rating: f64,
    pub review_count: i64,
}

impl RatingSummary {
    pub const EMPTY: RatingSummary = RatingSummary {
        rating: 0.0,
        review_count: 0,
    };

    /// Mean of all ratings rounded to one decimal place.
    pub fn from_ratings(ratings: &[i32]) -> Self {
        if ratings.is_empty() {
            return Self::EMPTY;
        }
        let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
        let mean = sum as f64 / ratings.len() as f64;
        Self {
            rating: (mean * 10.0).round() / 10.0,
            review_count: ratings.len() as i64,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
