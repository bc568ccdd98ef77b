//! Booking REST API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;

use super::dto::{
    BookingResponse, CreateBookingRequest, PublicBookingResponse, UpdateBookingRequest,
    UpdateBookingStatusRequest,
};
use crate::application::{BookingChange, BookingService, NewBooking};
use crate::domain::Actor;
use crate::interfaces::http::common::{
    api_error, ApiError, ApiResponse, ApiResult, EmailQuery, EmptyData, ValidatedJson,
};

#[derive(Clone)]
pub struct BookingAppState {
    pub service: Arc<BookingService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created as Pending", body = ApiResponse<BookingResponse>),
        (status = 400, description = "Bad dates, price mismatch or too long"),
        (status = 404, description = "Vehicle not found"),
        (status = 409, description = "Vehicle unavailable or dates taken")
    )
)]
pub async fn create_booking(
    State(state): State<BookingAppState>,
    Extension(actor): Extension<Actor>,
    ValidatedJson(req): ValidatedJson<CreateBookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BookingResponse>>), ApiError> {
    let booking = state
        .service
        .create_booking(
            &actor,
            NewBooking {
                vehicle_id: req.vehicle_id,
                start: req.start_date,
                end: req.end_date,
                total_price: req.total_price,
            },
        )
        .await
        .map_err(api_error)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(booking.into())),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/user",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(EmailQuery),
    responses(
        (status = 200, description = "Caller's bookings, newest first", body = ApiResponse<Vec<BookingResponse>>),
        (status = 403, description = "Email is not the caller's")
    )
)]
pub async fn list_renter_bookings(
    State(state): State<BookingAppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<EmailQuery>,
) -> ApiResult<Vec<BookingResponse>> {
    let bookings = state
        .service
        .list_renter_bookings(&actor, &query.email)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(
        bookings.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/vehicle/{id}",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "All bookings of the vehicle", body = ApiResponse<Vec<BookingResponse>>),
        (status = 403, description = "Not the vehicle owner"),
        (status = 404, description = "Vehicle not found")
    )
)]
pub async fn list_vehicle_bookings(
    State(state): State<BookingAppState>,
    Extension(actor): Extension<Actor>,
    Path(vehicle_id): Path<String>,
) -> ApiResult<Vec<BookingResponse>> {
    let bookings = state
        .service
        .list_vehicle_bookings(&actor, &vehicle_id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(
        bookings.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/vehicle/{id}/public",
    tag = "Bookings",
    params(("id" = String, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Current and upcoming occupied intervals", body = ApiResponse<Vec<PublicBookingResponse>>),
        (status = 404, description = "Vehicle not found")
    )
)]
pub async fn public_bookings(
    State(state): State<BookingAppState>,
    Path(vehicle_id): Path<String>,
) -> ApiResult<Vec<PublicBookingResponse>> {
    let today = Utc::now().date_naive();
    let bookings = state
        .service
        .public_bookings(&vehicle_id, today)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(
        bookings.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    patch,
    path = "/api/v1/bookings/{id}",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Booking ID")),
    request_body = UpdateBookingRequest,
    responses(
        (status = 200, description = "Rescheduled", body = ApiResponse<BookingResponse>),
        (status = 403, description = "Not the renter"),
        (status = 409, description = "Dates taken or booking closed")
    )
)]
pub async fn update_booking(
    State(state): State<BookingAppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateBookingRequest>,
) -> ApiResult<BookingResponse> {
    let booking = state
        .service
        .update_booking(
            &actor,
            &id,
            BookingChange {
                start: req.start_date,
                end: req.end_date,
                total_price: req.total_price,
            },
        )
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(booking.into())))
}

#[utoipa::path(
    patch,
    path = "/api/v1/bookings/{id}/status",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Booking ID")),
    request_body = UpdateBookingStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<BookingResponse>),
        (status = 400, description = "Unknown action"),
        (status = 403, description = "Caller may not perform this action"),
        (status = 409, description = "Transition not allowed")
    )
)]
pub async fn update_booking_status(
    State(state): State<BookingAppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateBookingStatusRequest>,
) -> ApiResult<BookingResponse> {
    let booking = state
        .service
        .update_booking_status(&actor, &id, &req.action)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(booking.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/bookings/{id}",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Deleted", body = ApiResponse<EmptyData>),
        (status = 403, description = "Not the renter"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_booking(
    State(state): State<BookingAppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> ApiResult<EmptyData> {
    state
        .service
        .delete_booking(&actor, &id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}
