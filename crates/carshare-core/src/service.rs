use crate::authz::may_mutate;
use crate::error::AppError;
use crate::models::{ActingUser, CarId, CarListing, ReviewId, ReviewListing, UserId};
use crate::search::{CarSearch, PageParams};
use crate::traits::{CarStore, ReviewStore};
use crate::validation::{CarPatchSubmission, CarSubmission, ReviewSubmission, current_year};

/// Car listing operations: validate, authorize, then hand off to the store.
///
/// Generic over the store so the flow is testable without a database.
#[derive(Clone)]
pub struct CarService<S: CarStore> {
    store: S,
}

impl<S: CarStore> CarService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        actor: &ActingUser,
        submission: CarSubmission,
    ) -> Result<CarListing, AppError> {
        let car = submission.validate(current_year())?;
        let listing = self.store.insert(actor.id, &car).await?;
        tracing::info!(car_id = %listing.car.id, owner_id = %actor.id, "Car created");
        Ok(listing)
    }

    pub async fn get(&self, id: CarId) -> Result<CarListing, AppError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Car not found: {id}")))
    }

    pub async fn list(&self, params: PageParams) -> Result<Vec<CarListing>, AppError> {
        let page = params.validate()?;
        self.store.list(page).await
    }

    pub async fn search(&self, search: CarSearch) -> Result<Vec<CarListing>, AppError> {
        let query = search.validate()?;
        self.store.search(&query).await
    }

    /// Merge-patch an existing car. Nothing is written unless the actor
    /// owns the car or is an admin.
    pub async fn update(
        &self,
        actor: &ActingUser,
        id: CarId,
        submission: CarPatchSubmission,
    ) -> Result<CarListing, AppError> {
        let patch = submission.validate(current_year())?;
        self.authorize(actor, id, "update").await?;

        let listing = self
            .store
            .update(id, &patch)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Car not found: {id}")))?;
        tracing::info!(car_id = %id, actor_id = %actor.id, "Car updated");
        Ok(listing)
    }

    pub async fn delete(&self, actor: &ActingUser, id: CarId) -> Result<(), AppError> {
        self.authorize(actor, id, "delete").await?;

        if !self.store.delete(id).await? {
            return Err(AppError::NotFound(format!("Car not found: {id}")));
        }
        tracing::info!(car_id = %id, actor_id = %actor.id, "Car deleted");
        Ok(())
    }

    async fn authorize(&self, actor: &ActingUser, id: CarId, action: &str) -> Result<(), AppError> {
        let owner_id = self
            .store
            .owner_of(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Car not found: {id}")))?;

        if !may_mutate(actor, owner_id) {
            tracing::warn!(car_id = %id, actor_id = %actor.id, action, "Permission denied");
            return Err(AppError::PermissionDenied(format!(
                "You are not authorized to {action} this car"
            )));
        }
        Ok(())
    }
}

/// Review operations. Reviews are write-once.
#[derive(Clone)]
pub struct ReviewService<S: ReviewStore> {
    store: S,
}

impl<S: ReviewStore> ReviewService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The acting user is always recorded as the reviewer.
    pub async fn create(
        &self,
        actor: &ActingUser,
        submission: ReviewSubmission,
    ) -> Result<ReviewListing, AppError> {
        let review = submission.validate(actor.id)?;
        let listing = self.store.insert(&review).await?;
        tracing::info!(
            review_id = %listing.review.id,
            reviewee_id = %review.reviewee_id,
            rating = review.rating,
            "Review recorded"
        );
        Ok(listing)
    }

    pub async fn get(&self, id: ReviewId) -> Result<ReviewListing, AppError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Review not found: {id}")))
    }

    pub async fn list_for_user(
        &self,
        user_id: UserId,
        params: PageParams,
    ) -> Result<Vec<ReviewListing>, AppError> {
        let page = params.validate()?;
        self.store.list_for_user(user_id, page).await
    }
}
