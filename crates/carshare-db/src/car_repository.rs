use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use carshare_core::error::AppError;
use carshare_core::models::{
    Car, CarId, CarListing, CarPatch, MotorType, NewCar, Transmission, UserId, UserSummary,
};
use carshare_core::search::{Coordinates, Page, SearchQuery, SortField};
use carshare_core::traits::CarStore;

use crate::database::insert_error;

const LISTING_COLUMNS: &str = r#"
    SELECT c.id, c.owner_id, c.make, c.model, c.year, c.transmission_type, c.motor_type,
           c.price_per_day, c.description, c.is_listed, c.created_at, c.updated_at,
           u.username AS owner_username
    FROM cars c
    JOIN users u ON u.id = c.owner_id
"#;

/// Mean Earth radius used for great-circle distances.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Repository for car listings in PostgreSQL.
#[derive(Clone)]
pub struct CarRepository {
    pool: Pool<Postgres>,
}

impl CarRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// -- Internal row types for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct CarRow {
    id: Uuid,
    owner_id: Uuid,
    make: String,
    model: String,
    year: i32,
    transmission_type: String,
    motor_type: String,
    price_per_day: f64,
    description: Option<String>,
    is_listed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CarListingRow {
    #[sqlx(flatten)]
    car: CarRow,
    owner_username: String,
}

impl TryFrom<CarRow> for Car {
    type Error = AppError;

    fn try_from(row: CarRow) -> Result<Self, Self::Error> {
        Ok(Car {
            id: row.id,
            owner_id: row.owner_id,
            make: row.make,
            model: row.model,
            year: row.year,
            transmission_type: row
                .transmission_type
                .parse::<Transmission>()
                .map_err(AppError::DatabaseError)?,
            motor_type: row
                .motor_type
                .parse::<MotorType>()
                .map_err(AppError::DatabaseError)?,
            price_per_day: row.price_per_day,
            description: row.description,
            is_listed: row.is_listed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<CarListingRow> for CarListing {
    type Error = AppError;

    fn try_from(row: CarListingRow) -> Result<Self, Self::Error> {
        let owner = UserSummary {
            id: row.car.owner_id,
            username: row.owner_username,
        };
        Ok(CarListing {
            car: row.car.try_into()?,
            owner,
        })
    }
}

fn into_listings(rows: Vec<CarListingRow>) -> Result<Vec<CarListing>, AppError> {
    rows.into_iter().map(TryInto::try_into).collect()
}

/// Pushes the great-circle distance in km between `origin` and the owner.
/// NULL when the owner has no coordinates.
fn push_distance(qb: &mut QueryBuilder<'_, Postgres>, origin: Coordinates) {
    qb.push("(CASE WHEN u.latitude IS NULL OR u.longitude IS NULL THEN NULL ELSE ")
        .push_bind(EARTH_RADIUS_KM)
        .push(" * ACOS(LEAST(1.0, GREATEST(-1.0, COS(RADIANS(")
        .push_bind(origin.lat)
        .push(")) * COS(RADIANS(u.latitude)) * COS(RADIANS(u.longitude) - RADIANS(")
        .push_bind(origin.lon)
        .push(")) + SIN(RADIANS(")
        .push_bind(origin.lat)
        .push(")) * SIN(RADIANS(u.latitude))))) END)");
}

fn build_search(query: &SearchQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(LISTING_COLUMNS);
    qb.push(" WHERE c.is_listed");

    if let Some(make) = &query.make {
        qb.push(" AND LOWER(c.make) = LOWER(")
            .push_bind(make.clone())
            .push(")");
    }
    if let Some(motor_type) = query.motor_type {
        qb.push(" AND c.motor_type = ").push_bind(motor_type.as_str());
    }
    if let Some(transmission_type) = query.transmission_type {
        qb.push(" AND c.transmission_type = ")
            .push_bind(transmission_type.as_str());
    }
    if let Some(min) = query.price_min {
        qb.push(" AND c.price_per_day >= ").push_bind(min);
    }
    if let Some(max) = query.price_max {
        qb.push(" AND c.price_per_day <= ").push_bind(max);
    }
    if let Some(city) = &query.city {
        qb.push(" AND LOWER(u.city) = LOWER(")
            .push_bind(city.clone())
            .push(")");
    }
    if let (Some(km), Some(origin)) = (query.radius_km, query.origin) {
        qb.push(" AND u.latitude IS NOT NULL AND u.longitude IS NOT NULL AND ");
        push_distance(&mut qb, origin);
        qb.push(" <= ").push_bind(km);
    }

    qb.push(" ORDER BY ");
    match query.sort {
        Some((SortField::Price, direction)) => {
            qb.push("c.price_per_day ").push(direction.as_sql()).push(", ");
        }
        Some((SortField::Year, direction)) => {
            qb.push("c.year ").push(direction.as_sql()).push(", ");
        }
        Some((SortField::Distance, direction)) => {
            if let Some(origin) = query.origin {
                push_distance(&mut qb, origin);
                qb.push(" ").push(direction.as_sql()).push(" NULLS LAST, ");
            }
        }
        None => {}
    }
    qb.push("c.created_at ASC");

    qb.push(" OFFSET ")
        .push_bind(query.page.skip)
        .push(" LIMIT ")
        .push_bind(query.page.limit);
    qb
}

impl CarStore for CarRepository {
    async fn insert(&self, owner_id: UserId, car: &NewCar) -> Result<CarListing, AppError> {
        let row = sqlx::query_as::<_, CarListingRow>(
            r#"
            WITH c AS (
                INSERT INTO cars (owner_id, make, model, year, transmission_type, motor_type,
                                  price_per_day, description, is_listed)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING *
            )
            SELECT c.*, u.username AS owner_username
            FROM c
            JOIN users u ON u.id = c.owner_id
            "#,
        )
        .bind(owner_id)
        .bind(&car.make)
        .bind(&car.model)
        .bind(car.year)
        .bind(car.transmission_type.as_str())
        .bind(car.motor_type.as_str())
        .bind(car.price_per_day)
        .bind(&car.description)
        .bind(car.is_listed)
        .fetch_one(&self.pool)
        .await
        .map_err(insert_error)?;

        row.try_into()
    }

    async fn get(&self, id: CarId) -> Result<Option<CarListing>, AppError> {
        let row = sqlx::query_as::<_, CarListingRow>(&format!("{LISTING_COLUMNS} WHERE c.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list(&self, page: Page) -> Result<Vec<CarListing>, AppError> {
        let rows = sqlx::query_as::<_, CarListingRow>(&format!(
            "{LISTING_COLUMNS} ORDER BY c.created_at ASC OFFSET $1 LIMIT $2"
        ))
        .bind(page.skip)
        .bind(page.limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        into_listings(rows)
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<CarListing>, AppError> {
        let mut qb = build_search(query);
        let rows = qb
            .build_query_as::<CarListingRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        tracing::debug!(matches = rows.len(), "Car search");
        into_listings(rows)
    }

    async fn owner_of(&self, id: CarId) -> Result<Option<UserId>, AppError> {
        let row: Option<(Uuid,)> = sqlx::query_as(r#"SELECT owner_id FROM cars WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.map(|(owner_id,)| owner_id))
    }

    async fn update(&self, id: CarId, patch: &CarPatch) -> Result<Option<CarListing>, AppError> {
        // Absent fields bind NULL and keep the stored value.
        let row = sqlx::query_as::<_, CarListingRow>(
            r#"
            WITH c AS (
                UPDATE cars
                SET make = COALESCE($2, make),
                    model = COALESCE($3, model),
                    year = COALESCE($4, year),
                    transmission_type = COALESCE($5, transmission_type),
                    motor_type = COALESCE($6, motor_type),
                    price_per_day = COALESCE($7, price_per_day),
                    description = COALESCE($8, description),
                    is_listed = COALESCE($9, is_listed),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING *
            )
            SELECT c.*, u.username AS owner_username
            FROM c
            JOIN users u ON u.id = c.owner_id
            "#,
        )
        .bind(id)
        .bind(&patch.make)
        .bind(&patch.model)
        .bind(patch.year)
        .bind(patch.transmission_type.map(|t| t.as_str()))
        .bind(patch.motor_type.map(|m| m.as_str()))
        .bind(patch.price_per_day)
        .bind(&patch.description)
        .bind(patch.is_listed)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        row.map(TryInto::try_into).transpose()
    }

    async fn delete(&self, id: CarId) -> Result<bool, AppError> {
        let result = sqlx::query(r#"DELETE FROM cars WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
