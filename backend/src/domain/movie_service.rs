//! Movie use cases.
//!
//! The service validates input, maps repository failures to domain errors
//! and drives the optimistic update protocol: read the stored movie, merge
//! the patch, validate, then issue one conditional write.

use std::sync::Arc;

use chrono::Datelike;
use mockable::Clock;
use pagination::PageMetadata;
use tracing::{debug, info};

use crate::domain::Error;
use crate::domain::filters::{MovieListQuery, MovieSearch};
use crate::domain::movie::{Movie, MovieDraft, MoviePatch};
use crate::domain::ports::{MovieRepository, MovieRepositoryError};
use crate::domain::validator::Validator;

/// Map a repository failure to the error surfaced to callers.
pub(crate) fn map_movie_repository_error(error: MovieRepositoryError) -> Error {
    match error {
        MovieRepositoryError::NotFound { id } => {
            Error::not_found(format!("movie with id {id} not found"))
        }
        MovieRepositoryError::EditConflict => Error::edit_conflict(),
        other @ (MovieRepositoryError::Connection { .. }
        | MovieRepositoryError::Query { .. }
        | MovieRepositoryError::Timeout { .. }) => Error::internal(other.to_string()),
    }
}

/// Movie catalogue operations.
#[derive(Clone)]
pub struct MovieService {
    repository: Arc<dyn MovieRepository>,
    clock: Arc<dyn Clock>,
}

impl MovieService {
    /// Build the service over a repository and a clock.
    ///
    /// The clock bounds the release year of new and edited movies.
    pub fn new(repository: Arc<dyn MovieRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    fn current_year(&self) -> i32 {
        self.clock.utc().year()
    }

    /// Validate and store a new movie.
    ///
    /// # Errors
    ///
    /// Returns a validation error for invalid drafts and an internal error
    /// when storage fails.
    pub async fn create(&self, draft: MovieDraft) -> Result<Movie, Error> {
        let fields = draft.validate(self.current_year())?;
        let movie = self
            .repository
            .insert(&fields)
            .await
            .map_err(map_movie_repository_error)?;
        info!(movie_id = movie.id, "movie created");
        Ok(movie)
    }

    /// Fetch one movie.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for unknown identifiers.
    pub async fn get(&self, id: i64) -> Result<Movie, Error> {
        self.repository
            .get(id)
            .await
            .map_err(map_movie_repository_error)
    }

    /// Apply `patch` to movie `id`.
    ///
    /// When the patch names a version, the write only succeeds if the stored
    /// row still has it. Otherwise the version read here is used, so a
    /// concurrent writer between the read and the write still causes a
    /// conflict.
    ///
    /// # Errors
    ///
    /// Returns not-found, validation, edit-conflict or internal errors.
    pub async fn update(&self, id: i64, patch: MoviePatch) -> Result<Movie, Error> {
        let mut movie = self.get(id).await?;
        if let Some(version) = patch.version {
            movie.version = version;
        }
        let fields = patch.merge_onto(&movie).validate(self.current_year())?;
        movie.set_fields(fields);

        let version = self
            .repository
            .update(&movie)
            .await
            .map_err(map_movie_repository_error)?;
        debug!(movie_id = id, version, "movie updated");
        movie.version = version;
        Ok(movie)
    }

    /// Delete movie `id`.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when nothing was deleted.
    pub async fn delete(&self, id: i64) -> Result<(), Error> {
        self.repository
            .delete(id)
            .await
            .map_err(map_movie_repository_error)?;
        info!(movie_id = id, "movie deleted");
        Ok(())
    }

    /// Search movies.
    ///
    /// `validator` carries failures recorded while reading the raw query so
    /// they are reported alongside filter failures.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad filters and an internal error when
    /// storage fails.
    pub async fn list(
        &self,
        query: MovieListQuery,
        validator: Validator,
    ) -> Result<(Vec<Movie>, PageMetadata), Error> {
        let search: MovieSearch = query.into_search(validator)?;
        let (movies, total) = self
            .repository
            .search(&search)
            .await
            .map_err(map_movie_repository_error)?;
        Ok((movies, PageMetadata::calculate(total, search.page)))
    }
}
