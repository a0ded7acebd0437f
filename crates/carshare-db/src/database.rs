use carshare_core::AppError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::car_repository::CarRepository;
use crate::config::DatabaseConfig;
use crate::review_repository::ReviewRepository;
use crate::user_repository::UserRepository;

/// Central database facade. Owns the connection pool, runs migrations,
/// and vends repository instances.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL with the given configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect: {e}")))?;

        tracing::info!(max_connections = config.max_connections, "Connected to database");
        Ok(Self { pool })
    }

    /// Create a `Database` from an existing pool (useful for testing).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run all pending migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Migration failed: {e}")))?;
        Ok(())
    }

    pub fn car_repo(&self) -> CarRepository {
        CarRepository::new(self.pool.clone())
    }

    pub fn review_repo(&self) -> ReviewRepository {
        ReviewRepository::new(self.pool.clone())
    }

    pub fn user_repo(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}

/// Map an insert failure; a dangling user reference becomes `NotFound`,
/// a duplicate becomes `Conflict`.
pub(crate) fn insert_error(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            AppError::NotFound(format!("Referenced user does not exist: {}", db.message()))
        }
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(format!("Record already exists: {}", db.message()))
        }
        _ => AppError::DatabaseError(e.to_string()),
    }
}
