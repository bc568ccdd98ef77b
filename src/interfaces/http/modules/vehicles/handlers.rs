//! Vehicle REST API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{CreateVehicleRequest, UpdateVehicleRequest, VehicleResponse};
use crate::application::{NewVehicle, VehicleService};
use crate::domain::{Actor, Availability};
use crate::interfaces::http::common::{
    api_error, ApiError, ApiResponse, ApiResult, EmailQuery, EmptyData, ValidatedJson,
};

#[derive(Clone)]
pub struct VehicleAppState {
    pub service: Arc<VehicleService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/vehicles",
    tag = "Vehicles",
    security(("bearer_auth" = [])),
    request_body = CreateVehicleRequest,
    responses(
        (status = 201, description = "Vehicle listed", body = ApiResponse<VehicleResponse>),
        (status = 400, description = "Invalid availability"),
        (status = 422, description = "Field validation failed")
    )
)]
pub async fn create_vehicle(
    State(state): State<VehicleAppState>,
    Extension(actor): Extension<Actor>,
    ValidatedJson(req): ValidatedJson<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<VehicleResponse>>), ApiError> {
    let availability = req
        .availability
        .as_deref()
        .map(|a| a.parse::<Availability>())
        .transpose()
        .map_err(api_error)?;

    let details = req.details();
    let vehicle = state
        .service
        .create(
            &actor,
            NewVehicle {
                model: req.model,
                daily_price: req.daily_price,
                location: req.location,
                availability,
                details,
            },
        )
        .await
        .map_err(api_error)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(vehicle.into())),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/vehicles",
    tag = "Vehicles",
    responses(
        (status = 200, description = "Every listed vehicle, newest first", body = ApiResponse<Vec<VehicleResponse>>)
    )
)]
pub async fn list_vehicles(State(state): State<VehicleAppState>) -> ApiResult<Vec<VehicleResponse>> {
    let vehicles = state.service.list_all().await.map_err(api_error)?;
    Ok(Json(ApiResponse::success(
        vehicles.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/vehicles/user",
    tag = "Vehicles",
    security(("bearer_auth" = [])),
    params(EmailQuery),
    responses(
        (status = 200, description = "Vehicles owned by the caller", body = ApiResponse<Vec<VehicleResponse>>),
        (status = 403, description = "Email is not the caller's")
    )
)]
pub async fn list_owner_vehicles(
    State(state): State<VehicleAppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<EmailQuery>,
) -> ApiResult<Vec<VehicleResponse>> {
    let vehicles = state
        .service
        .list_owner(&actor, &query.email)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(
        vehicles.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/vehicles/{id}",
    tag = "Vehicles",
    params(("id" = String, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Vehicle details", body = ApiResponse<VehicleResponse>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_vehicle(
    State(state): State<VehicleAppState>,
    Path(id): Path<String>,
) -> ApiResult<VehicleResponse> {
    let vehicle = state.service.get(&id).await.map_err(api_error)?;
    Ok(Json(ApiResponse::success(vehicle.into())))
}

#[utoipa::path(
    patch,
    path = "/api/v1/vehicles/{id}",
    tag = "Vehicles",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Vehicle ID")),
    request_body = UpdateVehicleRequest,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<VehicleResponse>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_vehicle(
    State(state): State<VehicleAppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateVehicleRequest>,
) -> ApiResult<VehicleResponse> {
    let patch = req.into_patch().map_err(api_error)?;
    let vehicle = state
        .service
        .update(&actor, &id, patch)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(vehicle.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/vehicles/{id}",
    tag = "Vehicles",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Vehicle, its bookings and reviews deleted", body = ApiResponse<EmptyData>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_vehicle(
    State(state): State<VehicleAppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> ApiResult<EmptyData> {
    state
        .service
        .delete(&actor, &id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}
