use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;
pub type CarId = Uuid;
pub type ReviewId = Uuid;
pub type RentalId = Uuid;

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Role of an acting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Unknown role: {s}")),
        }
    }
}

/// The user on whose behalf a request runs, resolved by the identity layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingUser {
    pub id: UserId,
    pub role: Role,
}

impl ActingUser {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }
}

/// Public projection of a user, shown next to cars and reviews.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
}

/// A stored user account.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// DTO for inserting a user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub role: Role,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

// ---------------------------------------------------------------------------
// Car enumerations
// ---------------------------------------------------------------------------

/// Gearbox of a listed car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transmission {
    Manual,
    Automatic,
}

impl Transmission {
    pub const ALL: &'static [&'static str] = &["manual", "automatic"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Transmission::Manual => "manual",
            Transmission::Automatic => "automatic",
        }
    }
}

impl fmt::Display for Transmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Exact, case-sensitive membership: `"Manual"` is rejected.
impl FromStr for Transmission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Transmission::Manual),
            "automatic" => Ok(Transmission::Automatic),
            _ => Err(format!("Unknown transmission type: {s}")),
        }
    }
}

/// Engine of a listed car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotorType {
    Petrol,
    Diesel,
    Electric,
    Hybrid,
}

impl MotorType {
    pub const ALL: &'static [&'static str] = &["petrol", "diesel", "electric", "hybrid"];

    pub fn as_str(&self) -> &'static str {
        match self {
            MotorType::Petrol => "petrol",
            MotorType::Diesel => "diesel",
            MotorType::Electric => "electric",
            MotorType::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for MotorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MotorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "petrol" => Ok(MotorType::Petrol),
            "diesel" => Ok(MotorType::Diesel),
            "electric" => Ok(MotorType::Electric),
            "hybrid" => Ok(MotorType::Hybrid),
            _ => Err(format!("Unknown motor type: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Cars
// ---------------------------------------------------------------------------

/// A stored car listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Car {
    pub id: CarId,
    pub owner_id: UserId,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub transmission_type: Transmission,
    pub motor_type: MotorType,
    pub price_per_day: f64,
    pub description: Option<String>,
    pub is_listed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Car {
    /// Merge-patch: fields present in `patch` overwrite, absent fields stay.
    pub fn apply(mut self, patch: CarPatch) -> Self {
        if let Some(make) = patch.make {
            self.make = make;
        }
        if let Some(model) = patch.model {
            self.model = model;
        }
        if let Some(year) = patch.year {
            self.year = year;
        }
        if let Some(transmission_type) = patch.transmission_type {
            self.transmission_type = transmission_type;
        }
        if let Some(motor_type) = patch.motor_type {
            self.motor_type = motor_type;
        }
        if let Some(price_per_day) = patch.price_per_day {
            self.price_per_day = price_per_day;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(is_listed) = patch.is_listed {
            self.is_listed = is_listed;
        }
        self
    }
}

/// A validated create payload. The owner comes from the acting user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCar {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub transmission_type: Transmission,
    pub motor_type: MotorType,
    pub price_per_day: f64,
    pub description: Option<String>,
    pub is_listed: bool,
}

/// A validated partial update. `None` means "leave the stored value".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarPatch {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub transmission_type: Option<Transmission>,
    pub motor_type: Option<MotorType>,
    pub price_per_day: Option<f64>,
    pub description: Option<String>,
    pub is_listed: Option<bool>,
}

impl CarPatch {
    pub fn is_empty(&self) -> bool {
        *self == CarPatch::default()
    }
}

/// A car together with its owner's public profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarListing {
    pub car: Car,
    pub owner: UserSummary,
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

/// A stored review. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Review {
    pub id: ReviewId,
    pub rental_id: RentalId,
    pub reviewer_id: UserId,
    pub reviewee_id: UserId,
    pub rating: u8,
    pub comment: String,
    pub review_date: DateTime<Utc>,
}

/// A validated review ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub rental_id: RentalId,
    pub reviewer_id: UserId,
    pub reviewee_id: UserId,
    pub rating: u8,
    pub comment: String,
}

/// A review with both parties' public profiles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewListing {
    pub review: Review,
    pub reviewer: UserSummary,
    pub reviewee: UserSummary,
}
