pub mod car_repository;
pub mod config;
pub mod database;
pub mod review_repository;
pub mod user_repository;

pub use car_repository::CarRepository;
pub use config::DatabaseConfig;
pub use database::Database;
pub use review_repository::ReviewRepository;
pub use user_repository::UserRepository;
