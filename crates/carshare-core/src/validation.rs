//! Field-level validation of car and review submissions.
//!
//! Submissions arrive with every field optional so that a missing
//! required field surfaces as [`ValidationError::MissingField`] instead of
//! a deserialization failure. Every validator is pure; the current year
//! is passed in by the caller.

use chrono::{Datelike, Utc};

use crate::error::ValidationError;
use crate::models::{
    CarPatch, MotorType, NewCar, NewReview, RentalId, Transmission, UserId,
};

pub const MIN_YEAR: i64 = 1900;
pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;
pub const MAX_COMMENT_LEN: usize = 500;

/// Current calendar year in UTC.
pub fn current_year() -> i32 {
    Utc::now().year()
}

/// Accepts `1900 <= value <= current_year + 1`.
pub fn validate_year(value: i64, current_year: i32) -> Result<i32, ValidationError> {
    let boundary = i64::from(current_year) + 1;
    if value > boundary {
        return Err(ValidationError::out_of_range(
            "year",
            format!("Year cannot be in the future. Current year is {boundary}."),
        ));
    }
    if value < MIN_YEAR {
        return Err(ValidationError::out_of_range(
            "year",
            "Year cannot be earlier than 1900",
        ));
    }
    // In range of i32 after both checks.
    Ok(value as i32)
}

pub fn validate_price_per_day(value: f64) -> Result<f64, ValidationError> {
    if value < 0.0 {
        return Err(ValidationError::out_of_range(
            "price_per_day",
            "Input should be greater than or equal to 0",
        ));
    }
    Ok(value)
}

pub fn validate_rating(value: i64) -> Result<u8, ValidationError> {
    if !(MIN_RATING..=MAX_RATING).contains(&value) {
        return Err(ValidationError::out_of_range(
            "rating",
            format!("Rating must be between {MIN_RATING} and {MAX_RATING}"),
        ));
    }
    Ok(value as u8)
}

/// Length is counted in Unicode scalar values, not bytes.
pub fn validate_comment(value: String) -> Result<String, ValidationError> {
    let actual = value.chars().count();
    if actual > MAX_COMMENT_LEN {
        return Err(ValidationError::TooLong {
            field: "comment",
            max: MAX_COMMENT_LEN,
            actual,
        });
    }
    Ok(value)
}

pub fn parse_transmission(
    field: &'static str,
    value: &str,
) -> Result<Transmission, ValidationError> {
    value.parse().map_err(|_| ValidationError::InvalidEnum {
        field,
        value: value.to_string(),
        allowed: Transmission::ALL,
    })
}

pub fn parse_motor_type(field: &'static str, value: &str) -> Result<MotorType, ValidationError> {
    value.parse().map_err(|_| ValidationError::InvalidEnum {
        field,
        value: value.to_string(),
        allowed: MotorType::ALL,
    })
}

pub(crate) fn require<T>(value: Option<T>, field: &'static str) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::MissingField { field })
}

// ---------------------------------------------------------------------------
// Cars
// ---------------------------------------------------------------------------

/// Untyped body of a create-car request.
#[derive(Debug, Clone, Default)]
pub struct CarSubmission {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i64>,
    pub transmission_type: Option<String>,
    pub motor_type: Option<String>,
    pub price_per_day: Option<f64>,
    pub description: Option<String>,
    pub is_listed: Option<bool>,
}

impl CarSubmission {
    /// Fields are checked in declaration order; the first failure wins.
    ///
    /// `year` defaults to `current_year`, `is_listed` to `true`.
    pub fn validate(self, current_year: i32) -> Result<NewCar, ValidationError> {
        let make = require(self.make, "make")?;
        let model = require(self.model, "model")?;
        let year = match self.year {
            Some(year) => validate_year(year, current_year)?,
            None => current_year,
        };
        let transmission_type = parse_transmission(
            "transmission_type",
            &require(self.transmission_type, "transmission_type")?,
        )?;
        let motor_type = parse_motor_type("motor_type", &require(self.motor_type, "motor_type")?)?;
        let price_per_day = require(self.price_per_day, "price_per_day")?;

        Ok(NewCar {
            make,
            model,
            year,
            transmission_type,
            motor_type,
            price_per_day,
            description: self.description,
            is_listed: self.is_listed.unwrap_or(true),
        })
    }
}

/// Untyped body of a partial car update.
#[derive(Debug, Clone, Default)]
pub struct CarPatchSubmission {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i64>,
    pub transmission_type: Option<String>,
    pub motor_type: Option<String>,
    pub price_per_day: Option<f64>,
    pub description: Option<String>,
    pub is_listed: Option<bool>,
}

impl CarPatchSubmission {
    /// Only present fields are validated.
    pub fn validate(self, current_year: i32) -> Result<CarPatch, ValidationError> {
        let year = self
            .year
            .map(|year| validate_year(year, current_year))
            .transpose()?;
        let transmission_type = self
            .transmission_type
            .as_deref()
            .map(|value| parse_transmission("transmission_type", value))
            .transpose()?;
        let motor_type = self
            .motor_type
            .as_deref()
            .map(|value| parse_motor_type("motor_type", value))
            .transpose()?;
        let price_per_day = self.price_per_day.map(validate_price_per_day).transpose()?;

        Ok(CarPatch {
            make: self.make,
            model: self.model,
            year,
            transmission_type,
            motor_type,
            price_per_day,
            description: self.description,
            is_listed: self.is_listed,
        })
    }
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

/// Untyped body of a create-review request. The reviewer is never read
/// from the body.
#[derive(Debug, Clone, Default)]
pub struct ReviewSubmission {
    pub rental_id: Option<RentalId>,
    pub reviewee_id: Option<UserId>,
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

impl ReviewSubmission {
    pub fn validate(self, reviewer_id: UserId) -> Result<NewReview, ValidationError> {
        let rental_id = require(self.rental_id, "rental_id")?;
        let reviewee_id = require(self.reviewee_id, "reviewee_id")?;
        let rating = validate_rating(require(self.rating, "rating")?)?;
        let comment = validate_comment(require(self.comment, "comment")?)?;

        Ok(NewReview {
            rental_id,
            reviewer_id,
            reviewee_id,
            rating,
            comment,
        })
    }
}
