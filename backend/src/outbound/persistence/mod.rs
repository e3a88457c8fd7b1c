//! PostgreSQL persistence adapters using Diesel.
//!
//! Repositories translate between Diesel rows and domain types and map
//! driver failures onto the port error enums. Row structs and the schema
//! stay private to this module.
//!
//! # Example
//!
//! ```no_run
//! use yamda::outbound::persistence::{DbPool, DieselMovieRepository, PoolConfig};
//!
//! # async fn example() -> Result<(), yamda::outbound::persistence::PoolError> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/movies")).await?;
//! let repo = DieselMovieRepository::new(pool);
//! # Ok(())
//! # }
//! ```

mod diesel_basic_error_mapping;
mod diesel_movie_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_movie_repository::DieselMovieRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
