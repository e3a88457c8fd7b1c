//! Port for movie persistence.
//!
//! Updates use optimistic concurrency: the adapter writes only when the
//! stored version still equals [`Movie::version`], bumping it by one in the
//! same statement. A stale version surfaces as
//! [`MovieRepositoryError::EditConflict`]; the adapter never reads before it
//! writes.

use async_trait::async_trait;

use crate::domain::filters::MovieSearch;
use crate::domain::movie::{Movie, MovieFields};

use super::define_port_error;

define_port_error! {
    /// Errors raised by movie repository adapters.
    pub enum MovieRepositoryError {
        /// A connection could not be checked out of the pool.
        Connection { message: String } => "movie repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "movie repository query failed: {message}",
        /// The call did not finish within the configured deadline.
        Timeout { millis: u64 } => "movie repository call timed out after {millis}ms",
        /// No movie carries the identifier.
        NotFound { id: i64 } => "movie with id {id} not found",
        /// The stored version moved on since the caller read it.
        EditConflict => "movie was modified concurrently",
    }
}

/// Storage contract for movies.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovieRepository: Send + Sync {
    /// Insert a movie, returning it with its id, timestamp and version `1`.
    async fn insert(&self, fields: &MovieFields) -> Result<Movie, MovieRepositoryError>;

    /// Fetch a movie. Identifiers below `1` are never found.
    async fn get(&self, id: i64) -> Result<Movie, MovieRepositoryError>;

    /// Write the editable fields of `movie` if its version is current.
    ///
    /// Returns the new version.
    async fn update(&self, movie: &Movie) -> Result<i32, MovieRepositoryError>;

    /// Delete a movie. Identifiers below `1` are never found.
    async fn delete(&self, id: i64) -> Result<(), MovieRepositoryError>;

    /// One page of matching movies plus the total number of matches.
    async fn search(
        &self,
        search: &MovieSearch,
    ) -> Result<(Vec<Movie>, u64), MovieRepositoryError>;
}

#[cfg(any(test, feature = "test-support"))]
mod in_memory {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use pagination::SortDirection;

    use super::{MovieRepository, MovieRepositoryError};
    use crate::domain::filters::{MovieSearch, MovieSortColumn};
    use crate::domain::movie::{Movie, MovieFields};

    /// Movie store kept in process memory.
    ///
    /// Honours the same version rules as the database adapter, which makes
    /// it suitable for service tests and concurrency checks.
    #[derive(Debug, Default)]
    pub struct InMemoryMovieRepository {
        movies: Mutex<Vec<Movie>>,
    }

    impl InMemoryMovieRepository {
        fn with_movies<T>(&self, f: impl FnOnce(&mut Vec<Movie>) -> T) -> T {
            let mut guard = self.movies.lock().unwrap_or_else(|err| err.into_inner());
            f(&mut guard)
        }
    }

    fn compare(a: &Movie, b: &Movie, search: &MovieSearch) -> std::cmp::Ordering {
        let primary = match search.sort.column {
            MovieSortColumn::Id => a.id.cmp(&b.id),
            MovieSortColumn::Title => a.title.cmp(&b.title),
            MovieSortColumn::Year => a.year.cmp(&b.year),
            MovieSortColumn::Runtime => a.runtime.cmp(&b.runtime),
        };
        let primary = match search.sort.direction {
            SortDirection::Ascending => primary,
            SortDirection::Descending => primary.reverse(),
        };
        primary.then(a.id.cmp(&b.id))
    }

    #[async_trait]
    impl MovieRepository for InMemoryMovieRepository {
        async fn insert(&self, fields: &MovieFields) -> Result<Movie, MovieRepositoryError> {
            Ok(self.with_movies(|movies| {
                let id = movies.iter().map(|m| m.id).max().unwrap_or(0) + 1;
                let movie = Movie {
                    id,
                    created_at: Utc::now(),
                    title: fields.title.clone(),
                    runtime: fields.runtime,
                    genres: fields.genres.clone(),
                    year: fields.year,
                    version: 1,
                };
                movies.push(movie.clone());
                movie
            }))
        }

        async fn get(&self, id: i64) -> Result<Movie, MovieRepositoryError> {
            self.with_movies(|movies| movies.iter().find(|m| m.id == id).cloned())
                .ok_or_else(|| MovieRepositoryError::not_found(id))
        }

        async fn update(&self, movie: &Movie) -> Result<i32, MovieRepositoryError> {
            self.with_movies(|movies| {
                let stored = movies
                    .iter_mut()
                    .find(|m| m.id == movie.id && m.version == movie.version)
                    .ok_or(MovieRepositoryError::EditConflict)?;
                stored.title.clone_from(&movie.title);
                stored.year = movie.year;
                stored.runtime = movie.runtime;
                stored.genres.clone_from(&movie.genres);
                stored.version += 1;
                Ok(stored.version)
            })
        }

        async fn delete(&self, id: i64) -> Result<(), MovieRepositoryError> {
            self.with_movies(|movies| {
                let before = movies.len();
                movies.retain(|m| m.id != id);
                if movies.len() == before {
                    Err(MovieRepositoryError::not_found(id))
                } else {
                    Ok(())
                }
            })
        }

        async fn search(
            &self,
            search: &MovieSearch,
        ) -> Result<(Vec<Movie>, u64), MovieRepositoryError> {
            let title = search.title.to_lowercase();
            let mut matched: Vec<Movie> = self.with_movies(|movies| {
                movies
                    .iter()
                    .filter(|m| m.title.to_lowercase().contains(&title))
                    .filter(|m| m.genres.join(",").contains(&search.genres))
                    .cloned()
                    .collect()
            });
            matched.sort_by(|a, b| compare(a, b, search));
            let total = u64::try_from(matched.len()).unwrap_or(u64::MAX);
            let offset = usize::try_from(search.page.offset()).unwrap_or(usize::MAX);
            let limit = usize::try_from(search.page.limit()).unwrap_or(usize::MAX);
            let page = matched.into_iter().skip(offset).take(limit).collect();
            Ok((page, total))
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use in_memory::InMemoryMovieRepository;

#[cfg(test)]
mod tests {
    //! Contract checks against the in-memory store.

    use std::sync::Arc;

    use super::*;
    use crate::domain::filters::{Filters, MovieListQuery};
    use crate::domain::runtime::Runtime;
    use crate::domain::validator::Validator;
    use rstest::{fixture, rstest};

    #[fixture]
    fn fields() -> MovieFields {
        MovieFields {
            title: "Moana".to_owned(),
            year: 2016,
            runtime: Runtime::new(107),
            genres: vec!["animation".to_owned(), "adventure".to_owned()],
        }
    }

    #[rstest]
    #[tokio::test]
    async fn insert_assigns_id_and_first_version(fields: MovieFields) {
        let repo = InMemoryMovieRepository::default();
        let first = repo.insert(&fields).await.expect("insert");
        let second = repo.insert(&fields).await.expect("insert");
        assert_eq!(first.version, 1);
        assert!(second.id > first.id);
    }

    #[rstest]
    #[tokio::test]
    async fn stale_update_is_an_edit_conflict(fields: MovieFields) {
        let repo = InMemoryMovieRepository::default();
        let mut movie = repo.insert(&fields).await.expect("insert");
        movie.title = "Moana 2".to_owned();
        assert_eq!(repo.update(&movie).await, Ok(2));
        assert_eq!(
            repo.update(&movie).await,
            Err(MovieRepositoryError::EditConflict)
        );
        let stored = repo.get(movie.id).await.expect("get");
        assert_eq!(stored.version, 2);
    }

    #[rstest]
    #[tokio::test]
    async fn concurrent_updates_from_one_version_conflict_once(fields: MovieFields) {
        let repo = Arc::new(InMemoryMovieRepository::default());
        let movie = repo.insert(&fields).await.expect("insert");

        let (left, right) = tokio::join!(
            {
                let repo = Arc::clone(&repo);
                let mut movie = movie.clone();
                movie.year = 2017;
                async move { repo.update(&movie).await }
            },
            {
                let repo = Arc::clone(&repo);
                let mut movie = movie.clone();
                movie.year = 2018;
                async move { repo.update(&movie).await }
            }
        );

        let outcomes = [left, right];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(
            outcomes
                .iter()
                .filter(|r| matches!(r, Err(MovieRepositoryError::EditConflict)))
                .count(),
            1
        );
    }

    #[rstest]
    #[tokio::test]
    async fn delete_twice_reports_not_found(fields: MovieFields) {
        let repo = InMemoryMovieRepository::default();
        let movie = repo.insert(&fields).await.expect("insert");
        assert_eq!(repo.delete(movie.id).await, Ok(()));
        assert_eq!(
            repo.delete(movie.id).await,
            Err(MovieRepositoryError::not_found(movie.id))
        );
        assert_eq!(
            repo.get(movie.id).await,
            Err(MovieRepositoryError::not_found(movie.id))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn search_filters_sorts_and_pages(fields: MovieFields) {
        let repo = InMemoryMovieRepository::default();
        for (title, year) in [("Moana", 2016), ("Black Panther", 2018), ("Moana 2", 2024)] {
            let mut movie = fields.clone();
            movie.title = title.to_owned();
            movie.year = year;
            repo.insert(&movie).await.expect("insert");
        }

        let search = MovieListQuery {
            title: "moana".to_owned(),
            genres: "adventure".to_owned(),
            filters: Filters {
                page: 1,
                page_size: 1,
                sort: "-year".to_owned(),
            },
        }
        .into_search(Validator::new())
        .expect("valid search");

        let (page, total) = repo.search(&search).await.expect("search");
        assert_eq!(total, 2);
        assert_eq!(page.len(), 1);
        assert_eq!(page.first().map(|m| m.title.as_str()), Some("Moana 2"));
    }

    #[rstest]
    fn not_found_message_names_the_id() {
        assert_eq!(
            MovieRepositoryError::not_found(700_i64).to_string(),
            "movie with id 700 not found"
        );
    }
}
