pub mod authz;
pub mod error;
pub mod models;
pub mod search;
pub mod service;
pub mod traits;
pub mod validation;

#[cfg(test)]
pub mod testutil;

pub use authz::{Capability, may_mutate};
pub use error::{AppError, ValidationError};
pub use models::{ActingUser, Car, CarListing, MotorType, Review, ReviewListing, Role, Transmission};
pub use service::{CarService, ReviewService};
pub use traits::{CarStore, ReviewStore};
