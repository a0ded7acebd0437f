use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use carshare_core::error::AppError;
use carshare_core::models::{NewReview, Review, ReviewId, ReviewListing, UserId, UserSummary};
use carshare_core::search::Page;
use carshare_core::traits::ReviewStore;

use crate::database::insert_error;

/// Repository for rental reviews in PostgreSQL.
#[derive(Clone)]
pub struct ReviewRepository {
    pool: Pool<Postgres>,
}

impl ReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: Uuid,
    rental_id: Uuid,
    reviewer_id: Uuid,
    reviewee_id: Uuid,
    rating: i16,
    comment: String,
    review_date: DateTime<Utc>,
    reviewer_username: String,
    reviewee_username: String,
}

impl From<ReviewRow> for ReviewListing {
    fn from(row: ReviewRow) -> Self {
        ReviewListing {
            reviewer: UserSummary {
                id: row.reviewer_id,
                username: row.reviewer_username,
            },
            reviewee: UserSummary {
                id: row.reviewee_id,
                username: row.reviewee_username,
            },
            review: Review {
                id: row.id,
                rental_id: row.rental_id,
                reviewer_id: row.reviewer_id,
                reviewee_id: row.reviewee_id,
                // The table constrains rating to 1..=5.
                rating: row.rating as u8,
                comment: row.comment,
                review_date: row.review_date,
            },
        }
    }
}

impl ReviewStore for ReviewRepository {
    async fn insert(&self, review: &NewReview) -> Result<ReviewListing, AppError> {
        let row = sqlx::query_as::<_, ReviewRow>(
            r#"
            WITH r AS (
                INSERT INTO reviews (rental_id, reviewer_id, reviewee_id, rating, comment)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
            )
            SELECT r.*, a.username AS reviewer_username, b.username AS reviewee_username
            FROM r
            JOIN users a ON a.id = r.reviewer_id
            JOIN users b ON b.id = r.reviewee_id
            "#,
        )
        .bind(review.rental_id)
        .bind(review.reviewer_id)
        .bind(review.reviewee_id)
        .bind(i16::from(review.rating))
        .bind(&review.comment)
        .fetch_one(&self.pool)
        .await
        .map_err(insert_error)?;

        Ok(row.into())
    }

    async fn get(&self, id: ReviewId) -> Result<Option<ReviewListing>, AppError> {
        let row = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT r.*, a.username AS reviewer_username, b.username AS reviewee_username
            FROM reviews r
            JOIN users a ON a.id = r.reviewer_id
            JOIN users b ON b.id = r.reviewee_id
            WHERE r.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        page: Page,
    ) -> Result<Vec<ReviewListing>, AppError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT r.*, a.username AS reviewer_username, b.username AS reviewee_username
            FROM reviews r
            JOIN users a ON a.id = r.reviewer_id
            JOIN users b ON b.id = r.reviewee_id
            WHERE r.reviewee_id = $1
            ORDER BY r.review_date DESC
            OFFSET $2
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(page.skip)
        .bind(page.limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
