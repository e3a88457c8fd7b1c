//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::web;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{InMemoryMovieRepository, InMemoryUserRepository, MovieRepository};
use crate::domain::{MovieService, UserService};
use crate::inbound::http::state::HttpState;

/// Clock pinned to a fixed instant in 2024.
pub struct FixtureClock;

impl FixtureClock {
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
            .single()
            .unwrap_or_default()
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        Self::now().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        Self::now()
    }
}

/// State over the given movie repository and an empty user store.
pub fn state_with(movies: Arc<dyn MovieRepository>) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(
        MovieService::new(movies, Arc::new(FixtureClock)),
        UserService::new(Arc::new(InMemoryUserRepository::default())),
    ))
}

/// State over empty in-memory stores.
pub fn in_memory_state() -> web::Data<HttpState> {
    state_with(Arc::new(InMemoryMovieRepository::default()))
}
