//! Test utilities: in-memory implementations of the store traits.
//!
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded writes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    ActingUser, Car, CarId, CarListing, CarPatch, NewCar, NewReview, Review, ReviewId, ReviewListing, Role,
    UserId, UserSummary,
};
use crate::search::{Page, SearchQuery, SortDirection, SortField};
use crate::traits::{CarStore, ReviewStore};

type Users = Arc<Mutex<HashMap<UserId, UserSummary>>>;

fn register(users: &Users, username: &str, role: Role) -> ActingUser {
    let id = Uuid::new_v4();
    users.lock().unwrap().insert(
        id,
        UserSummary {
            id,
            username: username.to_string(),
        },
    );
    ActingUser::new(id, role)
}

fn lookup(users: &Users, id: UserId) -> Result<UserSummary, AppError> {
    users
        .lock()
        .unwrap()
        .get(&id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("User not found: {id}")))
}

fn paginate<T>(items: Vec<T>, page: Page) -> Vec<T> {
    items
        .into_iter()
        .skip(page.skip as usize)
        .take(page.limit as usize)
        .collect()
}

// ---------------------------------------------------------------------------
// MockCarStore
// ---------------------------------------------------------------------------

/// In-memory car store. Location filters are ignored.
#[derive(Clone, Default)]
pub struct MockCarStore {
    users: Users,
    cars: Arc<Mutex<Vec<Car>>>,
    writes: Arc<Mutex<usize>>,
    error: Arc<Mutex<Option<AppError>>>,
    vanish: Arc<Mutex<bool>>,
    interleave: bool,
}

impl MockCarStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose next call fails with `error`.
    pub fn with_error(error: AppError) -> Self {
        Self {
            error: Arc::new(Mutex::new(Some(error))),
            ..Self::default()
        }
    }

    /// Store that yields to the executor at the start of every call, so
    /// operations joined on one task interleave.
    pub fn interleaved() -> Self {
        Self {
            interleave: true,
            ..Self::default()
        }
    }

    pub fn add_user(&self, username: &str, role: Role) -> ActingUser {
        register(&self.users, username, role)
    }

    /// Drops every car just before the next update is applied, as if a
    /// concurrent delete won the race.
    pub fn vanish_on_next_update(&self) {
        *self.vanish.lock().unwrap() = true;
    }

    /// Number of insert/update/delete calls that reached the store.
    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    async fn check(&self) -> Result<(), AppError> {
        if self.interleave {
            tokio::task::yield_now().await;
        }
        match self.error.lock().unwrap().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn record_write(&self) {
        *self.writes.lock().unwrap() += 1;
    }

    fn listing(&self, car: Car) -> Result<CarListing, AppError> {
        let owner = lookup(&self.users, car.owner_id)?;
        Ok(CarListing { car, owner })
    }
}

impl CarStore for MockCarStore {
    async fn insert(&self, owner_id: UserId, car: &NewCar) -> Result<CarListing, AppError> {
        self.check().await?;
        self.record_write();
        let now = Utc::now();
        let car = Car {
            id: Uuid::new_v4(),
            owner_id,
            make: car.make.clone(),
            model: car.model.clone(),
            year: car.year,
            transmission_type: car.transmission_type,
            motor_type: car.motor_type,
            price_per_day: car.price_per_day,
            description: car.description.clone(),
            is_listed: car.is_listed,
            created_at: now,
            updated_at: now,
        };
        let listing = self.listing(car.clone())?;
        self.cars.lock().unwrap().push(car);
        Ok(listing)
    }

    async fn get(&self, id: CarId) -> Result<Option<CarListing>, AppError> {
        self.check().await?;
        let car = self.cars.lock().unwrap().iter().find(|c| c.id == id).cloned();
        car.map(|c| self.listing(c)).transpose()
    }

    async fn list(&self, page: Page) -> Result<Vec<CarListing>, AppError> {
        self.check().await?;
        let cars = self.cars.lock().unwrap().clone();
        paginate(cars, page)
            .into_iter()
            .map(|c| self.listing(c))
            .collect()
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<CarListing>, AppError> {
        self.check().await?;
        let mut cars: Vec<Car> = self
            .cars
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.is_listed)
            .filter(|c| {
                query
                    .make
                    .as_ref()
                    .is_none_or(|m| c.make.eq_ignore_ascii_case(m))
            })
            .filter(|c| query.motor_type.is_none_or(|m| c.motor_type == m))
            .filter(|c| {
                query
                    .transmission_type
                    .is_none_or(|t| c.transmission_type == t)
            })
            .filter(|c| query.price_min.is_none_or(|p| c.price_per_day >= p))
            .filter(|c| query.price_max.is_none_or(|p| c.price_per_day <= p))
            .cloned()
            .collect();

        if let Some((field, direction)) = query.sort {
            match field {
                SortField::Price => {
                    cars.sort_by(|a, b| a.price_per_day.total_cmp(&b.price_per_day))
                }
                SortField::Year => cars.sort_by_key(|c| c.year),
                SortField::Distance => {}
            }
            if direction == SortDirection::Desc {
                cars.reverse();
            }
        }

        paginate(cars, query.page)
            .into_iter()
            .map(|c| self.listing(c))
            .collect()
    }

    async fn owner_of(&self, id: CarId) -> Result<Option<UserId>, AppError> {
        self.check().await?;
        Ok(self
            .cars
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.owner_id))
    }

    async fn update(&self, id: CarId, patch: &CarPatch) -> Result<Option<CarListing>, AppError> {
        self.check().await?;
        self.record_write();
        let updated = {
            let mut cars = self.cars.lock().unwrap();
            if std::mem::take(&mut *self.vanish.lock().unwrap()) {
                cars.clear();
            }
            cars.iter_mut().find(|c| c.id == id).map(|stored| {
                let mut car = stored.clone().apply(patch.clone());
                car.updated_at = Utc::now();
                *stored = car.clone();
                car
            })
        };
        updated.map(|car| self.listing(car)).transpose()
    }

    async fn delete(&self, id: CarId) -> Result<bool, AppError> {
        self.check().await?;
        self.record_write();
        let mut cars = self.cars.lock().unwrap();
        let before = cars.len();
        cars.retain(|c| c.id != id);
        Ok(cars.len() < before)
    }
}

// ---------------------------------------------------------------------------
// MockReviewStore
// ---------------------------------------------------------------------------

/// In-memory review store that records every saved review.
#[derive(Clone, Default)]
pub struct MockReviewStore {
    users: Users,
    pub saved: Arc<Mutex<Vec<Review>>>,
}

impl MockReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, username: &str, role: Role) -> ActingUser {
        register(&self.users, username, role)
    }

    fn listing(&self, review: Review) -> Result<ReviewListing, AppError> {
        let reviewer = lookup(&self.users, review.reviewer_id)?;
        let reviewee = lookup(&self.users, review.reviewee_id)?;
        Ok(ReviewListing {
            review,
            reviewer,
            reviewee,
        })
    }
}

impl ReviewStore for MockReviewStore {
    async fn insert(&self, review: &NewReview) -> Result<ReviewListing, AppError> {
        let duplicate = self
            .saved
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.rental_id == review.rental_id && r.reviewer_id == review.reviewer_id);
        if duplicate {
            return Err(AppError::Conflict(format!(
                "Review already exists for rental {}",
                review.rental_id
            )));
        }
        let review = Review {
            id: Uuid::new_v4(),
            rental_id: review.rental_id,
            reviewer_id: review.reviewer_id,
            reviewee_id: review.reviewee_id,
            rating: review.rating,
            comment: review.comment.clone(),
            review_date: Utc::now(),
        };
        let listing = self.listing(review.clone())?;
        self.saved.lock().unwrap().push(review);
        Ok(listing)
    }

    async fn get(&self, id: ReviewId) -> Result<Option<ReviewListing>, AppError> {
        let review = self.saved.lock().unwrap().iter().find(|r| r.id == id).cloned();
        review.map(|r| self.listing(r)).transpose()
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        page: Page,
    ) -> Result<Vec<ReviewListing>, AppError> {
        let reviews: Vec<Review> = self
            .saved
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|r| r.reviewee_id == user_id)
            .cloned()
            .collect();
        paginate(reviews, page)
            .into_iter()
            .map(|r| self.listing(r))
            .collect()
    }
}
