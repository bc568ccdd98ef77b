//! API router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, patch, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{BookingRules, BookingService, ReviewService, VehicleService};
use crate::domain::RepositoryProvider;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::common::{ApiResponse, EmptyData};
use crate::interfaces::http::middleware::{auth_middleware, AuthState};
use crate::interfaces::http::modules::bookings::{self, BookingAppState};
use crate::interfaces::http::modules::health::{self, HealthState};
use crate::interfaces::http::modules::metrics::{
    http_metrics_middleware, prometheus_metrics, MetricsState,
};
use crate::interfaces::http::modules::request_id::request_id_middleware;
use crate::interfaces::http::modules::reviews::{self, ReviewAppState};
use crate::interfaces::http::modules::vehicles::{self, VehicleAppState};

/// State shared by every `/api/v1` route; handlers pick their slice via `FromRef`
#[derive(Clone)]
pub struct ApiState {
    pub repos: Arc<dyn RepositoryProvider>,
    pub auth: AuthState,
    pub vehicles: Arc<VehicleService>,
    pub bookings: Arc<BookingService>,
    pub reviews: Arc<ReviewService>,
    pub started_at: Arc<Instant>,
}

impl ApiState {
    pub fn new(repos: Arc<dyn RepositoryProvider>, jwt_config: JwtConfig, rules: BookingRules) -> Self {
        let retry = rules.retry.clone();
        Self {
            vehicles: Arc::new(VehicleService::new(repos.clone())),
            bookings: Arc::new(BookingService::new(repos.clone(), rules)),
            reviews: Arc::new(ReviewService::new(repos.clone(), retry)),
            auth: AuthState { jwt_config },
            started_at: Arc::new(Instant::now()),
            repos,
        }
    }
}

impl FromRef<ApiState> for AuthState {
    fn from_ref(s: &ApiState) -> Self {
        s.auth.clone()
    }
}

impl FromRef<ApiState> for VehicleAppState {
    fn from_ref(s: &ApiState) -> Self {
        VehicleAppState {
            service: Arc::clone(&s.vehicles),
        }
    }
}

impl FromRef<ApiState> for BookingAppState {
    fn from_ref(s: &ApiState) -> Self {
        BookingAppState {
            service: Arc::clone(&s.bookings),
        }
    }
}

impl FromRef<ApiState> for ReviewAppState {
    fn from_ref(s: &ApiState) -> Self {
        ReviewAppState {
            service: Arc::clone(&s.reviews),
        }
    }
}

impl FromRef<ApiState> for HealthState {
    fn from_ref(s: &ApiState) -> Self {
        HealthState {
            repos: Arc::clone(&s.repos),
            started_at: Arc::clone(&s.started_at),
        }
    }
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Identity token; `sub` is the account email"))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        // Vehicles
        vehicles::create_vehicle,
        vehicles::list_vehicles,
        vehicles::list_owner_vehicles,
        vehicles::get_vehicle,
        vehicles::update_vehicle,
        vehicles::delete_vehicle,
        // Bookings
        bookings::create_booking,
        bookings::list_renter_bookings,
        bookings::list_vehicle_bookings,
        bookings::public_bookings,
        bookings::update_booking,
        bookings::update_booking_status,
        bookings::delete_booking,
        // Reviews
        reviews::create_review,
        reviews::list_reviews,
        reviews::list_reviewer_reviews,
        reviews::list_vehicle_reviews,
        reviews::update_review,
        reviews::delete_review,
    ),
    components(
        schemas(
            ApiResponse<String>,
            EmptyData,
            health::HealthResponse,
            health::ComponentHealth,
            vehicles::VehicleResponse,
            vehicles::CreateVehicleRequest,
            vehicles::UpdateVehicleRequest,
            bookings::BookingResponse,
            bookings::PublicBookingResponse,
            bookings::CreateBookingRequest,
            bookings::UpdateBookingRequest,
            bookings::UpdateBookingStatusRequest,
            reviews::ReviewResponse,
            reviews::RatingSummaryResponse,
            reviews::ReviewWithRatingResponse,
            reviews::CreateReviewRequest,
            reviews::UpdateReviewRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and store connectivity"),
        (name = "Vehicles", description = "Vehicle listings owned by hosts"),
        (name = "Bookings", description = "Reservations, conflict checks and status changes"),
        (name = "Reviews", description = "Post-rental reviews and vehicle ratings"),
    ),
    info(
        title = "Car Rental API",
        version = "1.0.0",
        description = "Vehicle listings, bookings with date-conflict protection, and reviews"
    )
)]
pub struct ApiDoc;

/// Build the full HTTP application.
///
/// `/metrics` is mounted only when a Prometheus handle is supplied.
pub fn create_api_router(
    repos: Arc<dyn RepositoryProvider>,
    jwt_config: JwtConfig,
    rules: BookingRules,
    prometheus: Option<PrometheusHandle>,
) -> Router {
    let state = ApiState::new(repos, jwt_config, rules);

    let protected = Router::new()
        .route("/vehicles", post(vehicles::create_vehicle))
        .route("/vehicles/user", get(vehicles::list_owner_vehicles))
        .route(
            "/vehicles/{id}",
            patch(vehicles::update_vehicle).delete(vehicles::delete_vehicle),
        )
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings/user", get(bookings::list_renter_bookings))
        .route(
            "/bookings/vehicle/{id}",
            get(bookings::list_vehicle_bookings),
        )
        .route(
            "/bookings/{id}",
            patch(bookings::update_booking).delete(bookings::delete_booking),
        )
        .route(
            "/bookings/{id}/status",
            patch(bookings::update_booking_status),
        )
        .route("/reviews", post(reviews::create_review))
        .route("/reviews/user", get(reviews::list_reviewer_reviews))
        .route(
            "/reviews/{id}",
            patch(reviews::update_review).delete(reviews::delete_review),
        )
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ));

    let public = Router::new()
        .route("/vehicles", get(vehicles::list_vehicles))
        .route("/vehicles/{id}", get(vehicles::get_vehicle))
        .route(
            "/bookings/vehicle/{id}/public",
            get(bookings::public_bookings),
        )
        .route("/reviews", get(reviews::list_reviews))
        .route("/reviews/vehicle/{id}", get(reviews::list_vehicle_reviews));

    let mut app = Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", protected.merge(public))
        .with_state(state);

    if let Some(handle) = prometheus {
        app = app.merge(
            Router::new()
                .route("/metrics", get(prometheus_metrics))
                .with_state(MetricsState { handle }),
        );
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    app.route_layer(middleware::from_fn(http_metrics_middleware))
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::infrastructure::crypto::jwt::sign_token;
    use crate::infrastructure::storage::InMemoryStore;

    const OWNER: &str = "owner@x.com";
    const RENTER: &str = "renter@x.com";

    fn app() -> (Router, JwtConfig) {
        let jwt = JwtConfig {
            secret: "router-test-secret".into(),
            issuer: "car-rental".into(),
        };
        let router = create_api_router(
            Arc::new(InMemoryStore::new()),
            jwt.clone(),
            BookingRules::default(),
            None,
        );
        (router, jwt)
    }

    fn listing(model: &str, daily_price: i64, location: &str) -> Value {
        json!({
            "model": model,
            "daily_price": daily_price,
            "location": location,
            "registration": "DHA-GA-11-2233",
            "description": "Well kept car, non-smoking",
            "features": ["AC", "Bluetooth"],
            "image_urls": ["https://img.example.com/car.jpg"]
        })
    }

    async fn call(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header("authorization", format!("Bearer {}", token));
        }
        let req = match body {
            Some(body) => req
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };

        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn health_is_public() {
        let (app, _) = app();
        let (status, body) = call(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn protected_routes_need_a_valid_token() {
        let (app, jwt) = app();
        let (status, body) = call(&app, "POST", "/api/v1/bookings", None, Some(json!({}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);

        let (status, _) = call(&app, "GET", "/api/v1/bookings/user?email=a@x.com", Some("junk"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let expired = sign_token(RENTER, &jwt, -600);
        let (status, body) = call(
            &app,
            "GET",
            "/api/v1/bookings/user?email=renter@x.com",
            Some(&expired),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Token has expired");
    }

    #[tokio::test]
    async fn booking_flow_over_http() {
        let (app, jwt) = app();
        let owner = sign_token(OWNER, &jwt, 3600);
        let renter = sign_token(RENTER, &jwt, 3600);

        let (status, body) = call(
            &app,
            "POST",
            "/api/v1/vehicles",
            Some(&owner),
            Some(listing("Civic", 5000, "Dhaka")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let vehicle_id = body["data"]["id"].as_str().unwrap().to_string();

        // anyone can look at a listing
        let (status, body) = call(&app, "GET", &format!("/api/v1/vehicles/{}", vehicle_id), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["owner_email"], OWNER);

        let booking = json!({
            "vehicle_id": vehicle_id,
            "start_date": "2099-06-01",
            "end_date": "2099-06-04"
        });
        let (status, body) = call(&app, "POST", "/api/v1/bookings", Some(&renter), Some(booking)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["status"], "Pending");
        assert_eq!(body["data"]["total_price"], 15000);
        let booking_id = body["data"]["id"].as_str().unwrap().to_string();

        let status_uri = format!("/api/v1/bookings/{}/status", booking_id);
        let (status, _) = call(&app, "PATCH", &status_uri, Some(&renter), Some(json!({"action": "confirm"}))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = call(&app, "PATCH", &status_uri, Some(&owner), Some(json!({"action": "confirm"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "Confirmed");

        let (status, _) = call(&app, "PATCH", &status_uri, Some(&owner), Some(json!({"action": "archive"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let clash = json!({
            "vehicle_id": vehicle_id,
            "start_date": "2099-06-03",
            "end_date": "2099-06-05"
        });
        let other = sign_token("other@x.com", &jwt, 3600);
        let (status, _) = call(&app, "POST", "/api/v1/bookings", Some(&other), Some(clash)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = call(
            &app,
            "GET",
            &format!("/api/v1/bookings/vehicle/{}/public", vehicle_id),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let entries = body["data"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["start_date"], "2099-06-01");
        assert!(entries[0].get("renter_email").is_none());

        let (status, _) = call(
            &app,
            "GET",
            &format!("/api/v1/bookings/vehicle/{}", vehicle_id),
            Some(&renter),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn review_flow_over_http() {
        let (app, jwt) = app();
        let owner = sign_token(OWNER, &jwt, 3600);
        let renter = sign_token(RENTER, &jwt, 3600);

        let (_, body) = call(
            &app,
            "POST",
            "/api/v1/vehicles",
            Some(&owner),
            Some(listing("Aqua", 4000, "Sylhet")),
        )
        .await;
        let vehicle_id = body["data"]["id"].as_str().unwrap().to_string();

        let (_, body) = call(
            &app,
            "POST",
            "/api/v1/bookings",
            Some(&renter),
            Some(json!({"vehicle_id": vehicle_id, "start_date": "2099-01-01", "end_date": "2099-01-03"})),
        )
        .await;
        let booking_id = body["data"]["id"].as_str().unwrap().to_string();

        let review = json!({
            "vehicle_id": vehicle_id,
            "booking_id": booking_id,
            "rating": 4,
            "comment": "smooth ride, friendly host"
        });
        // still pending
        let (status, _) = call(&app, "POST", "/api/v1/reviews", Some(&renter), Some(review.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        call(
            &app,
            "PATCH",
            &format!("/api/v1/bookings/{}/status", booking_id),
            Some(&owner),
            Some(json!({"action": "confirm"})),
        )
        .await;

        let (status, body) = call(&app, "POST", "/api/v1/reviews", Some(&renter), Some(review.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["vehicle_rating"]["rating"], 4.0);
        assert_eq!(body["data"]["vehicle_rating"]["review_count"], 1);

        let (status, _) = call(&app, "POST", "/api/v1/reviews", Some(&renter), Some(review)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = call(
            &app,
            "POST",
            "/api/v1/reviews",
            Some(&renter),
            Some(json!({"vehicle_id": vehicle_id, "booking_id": booking_id, "rating": 7, "comment": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, body) = call(
            &app,
            "GET",
            &format!("/api/v1/reviews/vehicle/{}", vehicle_id),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (_, body) = call(&app, "GET", &format!("/api/v1/vehicles/{}", vehicle_id), None, None).await;
        assert_eq!(body["data"]["rating"], 4.0);
        assert_eq!(body["data"]["review_count"], 1);

        let (status, body) = call(&app, "GET", "/api/v1/reviews", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let all = body["data"].as_array().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0]["reviewer_email"], RENTER);
    }

    #[tokio::test]
    async fn vehicles_are_browsable_without_a_token() {
        let (app, jwt) = app();
        let owner = sign_token(OWNER, &jwt, 3600);

        let (status, _) = call(&app, "POST", "/api/v1/vehicles", None, Some(listing("Axio", 4000, "Khulna"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let mut no_images = listing("Axio", 4000, "Khulna");
        no_images["image_urls"] = json!([]);
        let (status, _) = call(&app, "POST", "/api/v1/vehicles", Some(&owner), Some(no_images)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = call(&app, "POST", "/api/v1/vehicles", Some(&owner), Some(listing("Axio", 4000, "Khulna"))).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = call(&app, "GET", "/api/v1/vehicles", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let all = body["data"].as_array().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0]["registration"], "DHA-GA-11-2233");
        assert_eq!(all[0]["features"], json!(["AC", "Bluetooth"]));
        assert_eq!(all[0]["image_urls"][0], "https://img.example.com/car.jpg");

        let uri = format!("/api/v1/vehicles/user?email={}", OWNER);
        let (status, _) = call(&app, "GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, body) = call(&app, "GET", &uri, Some(&owner), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn request_id_is_echoed() {
        let (app, _) = app();
        let resp = app
            .oneshot(
                Request::get("/health")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.headers()["x-request-id"], "abc-123");
    }
}
