//! Review REST API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{
    CreateReviewRequest, RatingSummaryResponse, ReviewResponse, ReviewWithRatingResponse,
    UpdateReviewRequest,
};
use crate::application::{NewReview, ReviewService};
use crate::domain::Actor;
use crate::interfaces::http::common::{
    api_error, ApiError, ApiResponse, ApiResult, EmailQuery, ValidatedJson,
};

#[derive(Clone)]
pub struct ReviewAppState {
    pub service: Arc<ReviewService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/reviews",
    tag = "Reviews",
    security(("bearer_auth" = [])),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review stored, vehicle rating recomputed", body = ApiResponse<ReviewWithRatingResponse>),
        (status = 400, description = "Booking is not reviewable or belongs to another vehicle"),
        (status = 403, description = "Not the booking's renter"),
        (status = 409, description = "Vehicle already reviewed by caller")
    )
)]
pub async fn create_review(
    State(state): State<ReviewAppState>,
    Extension(actor): Extension<Actor>,
    ValidatedJson(req): ValidatedJson<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReviewWithRatingResponse>>), ApiError> {
    let (review, summary) = state
        .service
        .create_review(
            &actor,
            NewReview {
                vehicle_id: req.vehicle_id,
                booking_id: req.booking_id,
                rating: req.rating,
                comment: req.comment,
            },
        )
        .await
        .map_err(api_error)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(ReviewWithRatingResponse {
            review: review.into(),
            vehicle_rating: Some(summary.into()),
        })),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/reviews/user",
    tag = "Reviews",
    security(("bearer_auth" = [])),
    params(EmailQuery),
    responses(
        (status = 200, description = "Reviews written by the caller", body = ApiResponse<Vec<ReviewResponse>>),
        (status = 403, description = "Email is not the caller's")
    )
)]
pub async fn list_reviewer_reviews(
    State(state): State<ReviewAppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<EmailQuery>,
) -> ApiResult<Vec<ReviewResponse>> {
    let reviews = state
        .service
        .list_reviewer_reviews(&actor, &query.email)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(
        reviews.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/reviews",
    tag = "Reviews",
    responses(
        (status = 200, description = "Every review, newest first", body = ApiResponse<Vec<ReviewResponse>>)
    )
)]
pub async fn list_reviews(State(state): State<ReviewAppState>) -> ApiResult<Vec<ReviewResponse>> {
    let reviews = state.service.list_all().await.map_err(api_error)?;
    Ok(Json(ApiResponse::success(
        reviews.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/reviews/vehicle/{id}",
    tag = "Reviews",
    params(("id" = String, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Reviews of the vehicle, newest first", body = ApiResponse<Vec<ReviewResponse>>),
        (status = 404, description = "Vehicle not found")
    )
)]
pub async fn list_vehicle_reviews(
    State(state): State<ReviewAppState>,
    Path(vehicle_id): Path<String>,
) -> ApiResult<Vec<ReviewResponse>> {
    let reviews = state
        .service
        .list_vehicle_reviews(&vehicle_id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(
        reviews.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    patch,
    path = "/api/v1/reviews/{id}",
    tag = "Reviews",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Review ID")),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<ReviewWithRatingResponse>),
        (status = 400, description = "Nothing to update"),
        (status = 403, description = "Not the reviewer"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_review(
    State(state): State<ReviewAppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateReviewRequest>,
) -> ApiResult<ReviewWithRatingResponse> {
    let (review, summary) = state
        .service
        .update_review(&actor, &id, req.rating, req.comment)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(ReviewWithRatingResponse {
        review: review.into(),
        vehicle_rating: summary.map(Into::into),
    })))
}

#[utoipa::path(
    delete,
    path = "/api/v1/reviews/{id}",
    tag = "Reviews",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Deleted; recomputed vehicle rating", body = ApiResponse<RatingSummaryResponse>),
        (status = 403, description = "Neither reviewer nor vehicle owner"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_review(
    State(state): State<ReviewAppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> ApiResult<RatingSummaryResponse> {
    let summary = state
        .service
        .delete_review(&actor, &id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(summary.into())))
}
