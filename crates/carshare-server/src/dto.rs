use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use carshare_core::models::{CarListing, ReviewListing, UserSummary};
use carshare_core::search::{CarSearch, PageParams};
use carshare_core::validation::{CarPatchSubmission, CarSubmission, ReviewSubmission};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
}

impl From<UserSummary> for UserResponse {
    fn from(user: UserSummary) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

// ---------------------------------------------------------------------------
// Cars
// ---------------------------------------------------------------------------

/// Every field is optional here; missing required fields are reported
/// by validation with the field name.
///
/// Request types mirror the core submissions so that `serde` and `utoipa`
/// stay at the HTTP edge.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateCarRequest {
    pub make: Option<String>,
    pub model: Option<String>,
    /// Defaults to the current year
    pub year: Option<i64>,
    /// One of: manual, automatic
    pub transmission_type: Option<String>,
    /// One of: petrol, diesel, electric, hybrid
    pub motor_type: Option<String>,
    pub price_per_day: Option<f64>,
    pub description: Option<String>,
    /// Defaults to true
    pub is_listed: Option<bool>,
}

impl From<CreateCarRequest> for CarSubmission {
    fn from(body: CreateCarRequest) -> Self {
        Self {
            make: body.make,
            model: body.model,
            year: body.year,
            transmission_type: body.transmission_type,
            motor_type: body.motor_type,
            price_per_day: body.price_per_day,
            description: body.description,
            is_listed: body.is_listed,
        }
    }
}

/// Merge-patch body: only the fields present are changed.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateCarRequest {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i64>,
    pub transmission_type: Option<String>,
    pub motor_type: Option<String>,
    /// Must be >= 0
    pub price_per_day: Option<f64>,
    pub description: Option<String>,
    pub is_listed: Option<bool>,
}

impl From<UpdateCarRequest> for CarPatchSubmission {
    fn from(body: UpdateCarRequest) -> Self {
        Self {
            make: body.make,
            model: body.model,
            year: body.year,
            transmission_type: body.transmission_type,
            motor_type: body.motor_type,
            price_per_day: body.price_per_day,
            description: body.description,
            is_listed: body.is_listed,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CarResponse {
    pub id: Uuid,
    pub owner: UserResponse,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub transmission_type: String,
    pub motor_type: String,
    pub price_per_day: f64,
    pub description: Option<String>,
    pub is_listed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CarListing> for CarResponse {
    fn from(listing: CarListing) -> Self {
        let car = listing.car;
        Self {
            id: car.id,
            owner: listing.owner.into(),
            make: car.make,
            model: car.model,
            year: car.year,
            transmission_type: car.transmission_type.to_string(),
            motor_type: car.motor_type.to_string(),
            price_per_day: car.price_per_day,
            description: car.description,
            is_listed: car.is_listed,
            created_at: car.created_at,
            updated_at: car.updated_at,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CarListResponse {
    pub cars: Vec<CarResponse>,
    pub total: usize,
}

impl From<Vec<CarListing>> for CarListResponse {
    fn from(listings: Vec<CarListing>) -> Self {
        let total = listings.len();
        Self {
            cars: listings.into_iter().map(CarResponse::from).collect(),
            total,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PageQuery {
    /// Number of records to skip (default 0)
    pub skip: Option<i64>,
    /// Maximum number of records to return (1-100, default 20)
    pub limit: Option<i64>,
}

impl From<PageQuery> for PageParams {
    fn from(query: PageQuery) -> Self {
        Self {
            skip: query.skip,
            limit: query.limit,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct SearchCarsQuery {
    /// Radius of the search in kilometers (ignored if search_in_city is also set)
    pub distance_km: Option<f64>,
    /// Name of the owner's city
    pub search_in_city: Option<String>,
    /// Latitude of the renter's location
    pub renter_lat: Option<f64>,
    /// Longitude of the renter's location
    pub renter_lon: Option<f64>,
    /// One of: petrol, diesel, electric, hybrid
    pub engine_type: Option<String>,
    /// One of: manual, automatic
    pub transmission_type: Option<String>,
    /// Minimum daily price
    pub price_min: Option<f64>,
    /// Maximum daily price
    pub price_max: Option<f64>,
    pub make: Option<String>,
    /// One of: price, year, distance
    pub sort: Option<String>,
    /// One of: asc, desc
    pub sort_direction: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl From<SearchCarsQuery> for CarSearch {
    fn from(query: SearchCarsQuery) -> Self {
        Self {
            distance_km: query.distance_km,
            search_in_city: query.search_in_city,
            renter_lat: query.renter_lat,
            renter_lon: query.renter_lon,
            engine_type: query.engine_type,
            transmission_type: query.transmission_type,
            price_min: query.price_min,
            price_max: query.price_max,
            make: query.make,
            sort: query.sort,
            sort_direction: query.sort_direction,
            skip: query.skip,
            limit: query.limit,
        }
    }
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateReviewRequest {
    pub rental_id: Option<Uuid>,
    pub reviewee_id: Option<Uuid>,
    /// 1 to 5
    pub rating: Option<i64>,
    /// At most 500 characters
    pub comment: Option<String>,
}

impl From<CreateReviewRequest> for ReviewSubmission {
    fn from(body: CreateReviewRequest) -> Self {
        Self {
            rental_id: body.rental_id,
            reviewee_id: body.reviewee_id,
            rating: body.rating,
            comment: body.comment,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub rental_id: Uuid,
    pub reviewer: UserResponse,
    pub reviewee: UserResponse,
    pub rating: u8,
    pub comment: String,
    pub review_date: DateTime<Utc>,
}

impl From<ReviewListing> for ReviewResponse {
    fn from(listing: ReviewListing) -> Self {
        Self {
            id: listing.review.id,
            rental_id: listing.review.rental_id,
            reviewer: listing.reviewer.into(),
            reviewee: listing.reviewee.into(),
            rating: listing.review.rating,
            comment: listing.review.comment,
            review_date: listing.review.review_date,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ReviewListResponse {
    pub reviews: Vec<ReviewResponse>,
    pub total: usize,
}

impl From<Vec<ReviewListing>> for ReviewListResponse {
    fn from(listings: Vec<ReviewListing>) -> Self {
        let total = listings.len();
        Self {
            reviews: listings.into_iter().map(ReviewResponse::from).collect(),
            total,
        }
    }
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Offending field, for validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}
