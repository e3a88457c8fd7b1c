//! Domain ports: the storage contracts the services depend on.
//!
//! Each trait exposes a typed error built with `define_port_error!` so
//! adapters map their failures into a closed set of variants.

mod macros;
pub(crate) use macros::define_port_error;

mod movie_repository;
mod user_repository;

#[cfg(test)]
pub use movie_repository::MockMovieRepository;
#[cfg(any(test, feature = "test-support"))]
pub use movie_repository::InMemoryMovieRepository;
pub use movie_repository::{MovieRepository, MovieRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
#[cfg(any(test, feature = "test-support"))]
pub use user_repository::InMemoryUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
