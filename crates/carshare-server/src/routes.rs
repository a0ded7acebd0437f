use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Extension, Router, middleware};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use carshare_core::models::ActingUser;
use carshare_core::{CarService, ReviewService};

use crate::auth::require_user;
use crate::dto::{
    CarListResponse, CarResponse, CreateCarRequest, CreateReviewRequest, HealthResponse,
    PageQuery, ReviewListResponse, ReviewResponse, SearchCarsQuery, UpdateCarRequest,
};
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Build the full router with all routes and middleware.
///
/// Reads are public; anything that writes needs a bearer token.
pub fn router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/v1/cars", post(create_car))
        .route("/v1/cars/{id}", patch(update_car).delete(delete_car))
        .route("/v1/reviews", post(create_review))
        .layer(middleware::from_fn_with_state(state.clone(), require_user));

    let public = Router::new()
        .route("/v1/cars", get(list_cars))
        .route("/v1/cars/search", get(search_cars))
        .route("/v1/cars/{id}", get(get_car))
        .route("/v1/reviews/{id}", get(get_review))
        .route("/v1/users/{id}/reviews", get(list_user_reviews))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    public.merge(protected).with_state(state)
}

fn car_service(state: &AppState) -> CarService<carshare_db::CarRepository> {
    CarService::new(state.db.car_repo())
}

fn review_service(state: &AppState) -> ReviewService<carshare_db::ReviewRepository> {
    ReviewService::new(state.db.review_repo())
}

// ---------------------------------------------------------------------------
// Cars
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/v1/cars",
    request_body = CreateCarRequest,
    responses(
        (status = 201, description = "Car listed", body = CarResponse),
        (status = 422, description = "Validation failed", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "cars"
)]
pub async fn create_car(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<ActingUser>,
    axum::Json(body): axum::Json<CreateCarRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let listing = car_service(&state).create(&actor, body.into()).await?;
    Ok((StatusCode::CREATED, axum::Json(CarResponse::from(listing))))
}

#[utoipa::path(
    get,
    path = "/v1/cars",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of cars, oldest first", body = CarListResponse),
        (status = 422, description = "Invalid pagination", body = crate::dto::ErrorResponse),
    ),
    tag = "cars"
)]
pub async fn list_cars(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let cars = car_service(&state).list(query.into()).await?;
    Ok(axum::Json(CarListResponse::from(cars)))
}

#[utoipa::path(
    get,
    path = "/v1/cars/search",
    params(SearchCarsQuery),
    responses(
        (status = 200, description = "Listed cars matching every filter", body = CarListResponse),
        (status = 422, description = "Invalid filter", body = crate::dto::ErrorResponse),
    ),
    tag = "cars"
)]
pub async fn search_cars(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchCarsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let cars = car_service(&state).search(query.into()).await?;
    Ok(axum::Json(CarListResponse::from(cars)))
}

#[utoipa::path(
    get,
    path = "/v1/cars/{id}",
    params(
        ("id" = Uuid, Path, description = "Car ID")
    ),
    responses(
        (status = 200, description = "Car details", body = CarResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    tag = "cars"
)]
pub async fn get_car(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let listing = car_service(&state).get(id).await?;
    Ok(axum::Json(CarResponse::from(listing)))
}

#[utoipa::path(
    patch,
    path = "/v1/cars/{id}",
    params(
        ("id" = Uuid, Path, description = "Car ID")
    ),
    request_body = UpdateCarRequest,
    responses(
        (status = 200, description = "Updated car", body = CarResponse),
        (status = 403, description = "Not the owner or an admin", body = crate::dto::ErrorResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "cars"
)]
pub async fn update_car(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<ActingUser>,
    Path(id): Path<Uuid>,
    axum::Json(body): axum::Json<UpdateCarRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let listing = car_service(&state).update(&actor, id, body.into()).await?;
    Ok(axum::Json(CarResponse::from(listing)))
}

#[utoipa::path(
    delete,
    path = "/v1/cars/{id}",
    params(
        ("id" = Uuid, Path, description = "Car ID")
    ),
    responses(
        (status = 204, description = "Car deleted"),
        (status = 403, description = "Not the owner or an admin", body = crate::dto::ErrorResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "cars"
)]
pub async fn delete_car(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<ActingUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    car_service(&state).delete(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/v1/reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review recorded", body = ReviewResponse),
        (status = 404, description = "Reviewee not found", body = crate::dto::ErrorResponse),
        (status = 409, description = "Reviewer already reviewed this rental", body = crate::dto::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "reviews"
)]
pub async fn create_review(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<ActingUser>,
    axum::Json(body): axum::Json<CreateReviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let listing = review_service(&state).create(&actor, body.into()).await?;
    Ok((StatusCode::CREATED, axum::Json(ReviewResponse::from(listing))))
}

#[utoipa::path(
    get,
    path = "/v1/reviews/{id}",
    params(
        ("id" = Uuid, Path, description = "Review ID")
    ),
    responses(
        (status = 200, description = "Review details", body = ReviewResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    tag = "reviews"
)]
pub async fn get_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let listing = review_service(&state).get(id).await?;
    Ok(axum::Json(ReviewResponse::from(listing)))
}

#[utoipa::path(
    get,
    path = "/v1/users/{id}/reviews",
    params(
        ("id" = Uuid, Path, description = "Reviewee user ID"),
        PageQuery,
    ),
    responses(
        (status = 200, description = "Reviews received by the user, newest first", body = ReviewListResponse),
        (status = 422, description = "Invalid pagination", body = crate::dto::ErrorResponse),
    ),
    tag = "reviews"
)]
pub async fn list_user_reviews(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let reviews = review_service(&state)
        .list_for_user(id, query.into())
        .await?;
    Ok(axum::Json(ReviewListResponse::from(reviews)))
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let db_status = match state.db.health_check().await {
        Ok(()) => "ok",
        Err(_) => "error",
    };

    let (status, label) = if db_status == "ok" {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    let response = HealthResponse {
        status: label,
        database: db_status,
    };

    (status, axum::Json(response))
}
