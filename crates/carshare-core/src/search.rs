use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::models::{MotorType, Transmission};
use crate::validation::{parse_motor_type, parse_transmission, require};

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

/// Validated pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Query-string pagination, bounds-checked by [`PageParams::validate`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PageParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn validate(self) -> Result<Page, ValidationError> {
        validate_page(self.skip, self.limit)
    }
}

fn validate_page(skip: Option<i64>, limit: Option<i64>) -> Result<Page, ValidationError> {
    let skip = skip.unwrap_or(0);
    if skip < 0 {
        return Err(ValidationError::out_of_range(
            "skip",
            "Input should be greater than or equal to 0",
        ));
    }
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(ValidationError::out_of_range(
            "limit",
            format!("Input should be between 1 and {MAX_LIMIT}"),
        ));
    }
    Ok(Page { skip, limit })
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Price,
    Year,
    Distance,
}

impl SortField {
    pub const ALL: &'static [&'static str] = &["price", "year", "distance"];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Price => "price",
            SortField::Year => "year",
            SortField::Distance => "distance",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price" => Ok(SortField::Price),
            "year" => Ok(SortField::Year),
            "distance" => Ok(SortField::Distance),
            _ => Err(format!("Unknown sort field: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const ALL: &'static [&'static str] = &["asc", "desc"];

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(format!("Unknown sort direction: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// A point given in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Validated car search. Only listed cars are ever matched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    /// Owner's city, compared case-insensitively.
    pub city: Option<String>,
    /// Renter position; required for radius filtering and distance sort.
    pub origin: Option<Coordinates>,
    /// Radius around `origin`. Never set together with `city`.
    pub radius_km: Option<f64>,
    pub motor_type: Option<MotorType>,
    pub transmission_type: Option<Transmission>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub make: Option<String>,
    pub sort: Option<(SortField, SortDirection)>,
    pub page: Page,
}

/// Raw search query string.
#[derive(Debug, Clone, Default)]
pub struct CarSearch {
    pub distance_km: Option<f64>,
    pub search_in_city: Option<String>,
    pub renter_lat: Option<f64>,
    pub renter_lon: Option<f64>,
    pub engine_type: Option<String>,
    pub transmission_type: Option<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub make: Option<String>,
    pub sort: Option<String>,
    pub sort_direction: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl CarSearch {
    pub fn validate(self) -> Result<SearchQuery, ValidationError> {
        let city = non_blank(self.search_in_city);
        let make = non_blank(self.make);

        let origin = match (self.renter_lat, self.renter_lon) {
            (None, None) => None,
            (lat, lon) => {
                let lat = require(lat, "renter_lat")?;
                let lon = require(lon, "renter_lon")?;
                if !(-90.0..=90.0).contains(&lat) {
                    return Err(ValidationError::out_of_range(
                        "renter_lat",
                        "Latitude must be between -90 and 90",
                    ));
                }
                if !(-180.0..=180.0).contains(&lon) {
                    return Err(ValidationError::out_of_range(
                        "renter_lon",
                        "Longitude must be between -180 and 180",
                    ));
                }
                Some(Coordinates { lat, lon })
            }
        };

        // A city search takes precedence over the radius.
        let radius_km = match self.distance_km {
            Some(_) if city.is_some() => None,
            Some(km) => {
                if !(km.is_finite() && km > 0.0) {
                    return Err(ValidationError::out_of_range(
                        "distance_km",
                        "Distance must be a finite number greater than 0",
                    ));
                }
                require(origin, "renter_lat")?;
                Some(km)
            }
            None => None,
        };

        let motor_type = self
            .engine_type
            .as_deref()
            .map(|value| parse_motor_type("engine_type", value))
            .transpose()?;
        let transmission_type = self
            .transmission_type
            .as_deref()
            .map(|value| parse_transmission("transmission_type", value))
            .transpose()?;

        for (field, price) in [("price_min", self.price_min), ("price_max", self.price_max)] {
            if price.is_some_and(|p| !p.is_finite()) {
                return Err(ValidationError::out_of_range(field, "Input should be a finite number"));
            }
            if price.is_some_and(|p| p < 0.0) {
                return Err(ValidationError::out_of_range(
                    field,
                    "Input should be greater than or equal to 0",
                ));
            }
        }
        if let (Some(min), Some(max)) = (self.price_min, self.price_max) {
            if min > max {
                return Err(ValidationError::out_of_range(
                    "price_min",
                    "price_min must not exceed price_max",
                ));
            }
        }

        let direction = match self.sort_direction.as_deref() {
            Some(value) => value.parse().map_err(|_| ValidationError::InvalidEnum {
                field: "sort_direction",
                value: value.to_string(),
                allowed: SortDirection::ALL,
            })?,
            None => SortDirection::default(),
        };
        let sort = match self.sort.as_deref() {
            Some(value) => {
                let field: SortField = value.parse().map_err(|_| ValidationError::InvalidEnum {
                    field: "sort",
                    value: value.to_string(),
                    allowed: SortField::ALL,
                })?;
                if field == SortField::Distance {
                    require(origin, "renter_lat")?;
                }
                Some((field, direction))
            }
            None => None,
        };

        let page = validate_page(self.skip, self.limit)?;

        Ok(SearchQuery {
            city,
            origin,
            radius_km,
            motor_type,
            transmission_type,
            price_min: self.price_min,
            price_max: self.price_max,
            make,
            sort,
            page,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
