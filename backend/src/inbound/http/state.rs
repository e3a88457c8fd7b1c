//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data`. The services only hold
//! port trait objects, so tests can swap in mocks or in-memory adapters.

use crate::domain::{MovieService, UserService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Movie catalogue use cases.
    pub movies: MovieService,
    /// Account use cases.
    pub users: UserService,
}

impl HttpState {
    /// Bundle the services handlers depend on.
    pub fn new(movies: MovieService, users: UserService) -> Self {
        Self { movies, users }
    }
}
