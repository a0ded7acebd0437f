use std::future::Future;

use crate::error::AppError;
use crate::models::{
    CarId, CarListing, CarPatch, NewCar, NewReview, ReviewId, ReviewListing, UserId,
};
use crate::search::{Page, SearchQuery};

/// Persists and retrieves car listings.
pub trait CarStore: Send + Sync + Clone {
    /// Insert a validated car for `owner_id`. Returns the stored listing.
    fn insert(
        &self,
        owner_id: UserId,
        car: &NewCar,
    ) -> impl Future<Output = Result<CarListing, AppError>> + Send;

    fn get(&self, id: CarId) -> impl Future<Output = Result<Option<CarListing>, AppError>> + Send;

    /// All cars, oldest first.
    fn list(&self, page: Page) -> impl Future<Output = Result<Vec<CarListing>, AppError>> + Send;

    fn search(
        &self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<Vec<CarListing>, AppError>> + Send;

    /// Owner of a car, or `None` if the car does not exist.
    fn owner_of(&self, id: CarId) -> impl Future<Output = Result<Option<UserId>, AppError>> + Send;

    /// Apply `patch` to the stored row in one step, so concurrent patches to
    /// different fields both land. `None` if the car does not exist.
    fn update(
        &self,
        id: CarId,
        patch: &CarPatch,
    ) -> impl Future<Output = Result<Option<CarListing>, AppError>> + Send;

    /// Returns `false` if no row was deleted.
    fn delete(&self, id: CarId) -> impl Future<Output = Result<bool, AppError>> + Send;
}

/// Persists and retrieves reviews.
pub trait ReviewStore: Send + Sync + Clone {
    fn insert(
        &self,
        review: &NewReview,
    ) -> impl Future<Output = Result<ReviewListing, AppError>> + Send;

    fn get(
        &self,
        id: ReviewId,
    ) -> impl Future<Output = Result<Option<ReviewListing>, AppError>> + Send;

    /// Reviews received by `user_id`, newest first.
    fn list_for_user(
        &self,
        user_id: UserId,
        page: Page,
    ) -> impl Future<Output = Result<Vec<ReviewListing>, AppError>> + Send;
}
