//! PostgreSQL-backed `MovieRepository` using Diesel.
//!
//! Updates are a single conditional statement:
//! `UPDATE movies SET ..., version = version + 1 WHERE id = $1 AND version = $2
//! RETURNING version`. No row back means the caller's version was stale.
//! Every call, including connection checkout, runs under the pool's query
//! deadline.

use std::future::Future;

use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{Array, Text};
use diesel_async::RunQueryDsl;
use pagination::SortDirection;

use crate::domain::filters::{MovieSearch, MovieSortColumn};
use crate::domain::movie::{Movie, MovieFields};
use crate::domain::ports::{MovieRepository, MovieRepositoryError};

use super::diesel_basic_error_mapping::{StoreFailure, classify_diesel_error, classify_pool_error};
use super::models::{MovieChangeset, MovieRow, NewMovieRow};
use super::pool::DbPool;
use super::schema::movies;

diesel::define_sql_function! {
    /// PostgreSQL `array_to_string(anyarray, text)`.
    fn array_to_string(array: Array<Text>, delimiter: Text) -> Text;
}

/// Diesel-backed implementation of the `MovieRepository` port.
#[derive(Clone)]
pub struct DieselMovieRepository {
    pool: DbPool,
}

impl DieselMovieRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn bounded<T, F>(&self, op: F) -> Result<T, MovieRepositoryError>
    where
        F: Future<Output = Result<T, MovieRepositoryError>>,
    {
        self.pool
            .with_deadline(op)
            .await
            .unwrap_or_else(|| Err(MovieRepositoryError::timeout(self.pool.query_timeout_millis())))
    }
}

fn map_failure(failure: StoreFailure) -> MovieRepositoryError {
    match failure {
        StoreFailure::Connection(message) => MovieRepositoryError::connection(message),
        StoreFailure::UniqueViolation { constraint } => MovieRepositoryError::query(format!(
            "unique constraint violated: {}",
            constraint.as_deref().unwrap_or("unknown")
        )),
        StoreFailure::Query(message) => MovieRepositoryError::query(message),
    }
}

fn map_diesel_error(error: diesel::result::Error) -> MovieRepositoryError {
    map_failure(classify_diesel_error(error))
}

fn map_pool_error(error: super::pool::PoolError) -> MovieRepositoryError {
    map_failure(classify_pool_error(error))
}

/// Escape `LIKE` wildcards so user input matches literally.
pub(crate) fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn contains_pattern(raw: &str) -> String {
    format!("%{}%", escape_like(raw))
}

fn filtered(search: &MovieSearch) -> movies::BoxedQuery<'static, Pg> {
    let mut query = movies::table.into_boxed();
    if !search.title.is_empty() {
        query = query.filter(movies::title.ilike(contains_pattern(&search.title)));
    }
    if !search.genres.is_empty() {
        query = query.filter(
            array_to_string(movies::genres, ",").like(contains_pattern(&search.genres)),
        );
    }
    query
}

fn ordered(
    query: movies::BoxedQuery<'static, Pg>,
    search: &MovieSearch,
) -> movies::BoxedQuery<'static, Pg> {
    use MovieSortColumn::{Id, Runtime, Title, Year};
    use SortDirection::{Ascending, Descending};

    let query = match (search.sort.column, search.sort.direction) {
        (Id, Ascending) => query.order(movies::id.asc()),
        (Id, Descending) => query.order(movies::id.desc()),
        (Title, Ascending) => query.order(movies::title.asc()),
        (Title, Descending) => query.order(movies::title.desc()),
        (Year, Ascending) => query.order(movies::year.asc()),
        (Year, Descending) => query.order(movies::year.desc()),
        (Runtime, Ascending) => query.order(movies::runtime.asc()),
        (Runtime, Descending) => query.order(movies::runtime.desc()),
    };
    query.then_order_by(movies::id.asc())
}

#[async_trait]
impl MovieRepository for DieselMovieRepository {
    async fn insert(&self, fields: &MovieFields) -> Result<Movie, MovieRepositoryError> {
        self.bounded(async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let row = diesel::insert_into(movies::table)
                .values(&NewMovieRow {
                    title: &fields.title,
                    year: fields.year,
                    runtime: fields.runtime.minutes(),
                    genres: &fields.genres,
                })
                .returning(MovieRow::as_returning())
                .get_result::<MovieRow>(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            Ok(row.into())
        })
        .await
    }

    async fn get(&self, id: i64) -> Result<Movie, MovieRepositoryError> {
        if id < 1 {
            return Err(MovieRepositoryError::not_found(id));
        }
        self.bounded(async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            movies::table
                .find(id)
                .select(MovieRow::as_select())
                .first::<MovieRow>(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?
                .map(Movie::from)
                .ok_or_else(|| MovieRepositoryError::not_found(id))
        })
        .await
    }

    async fn update(&self, movie: &Movie) -> Result<i32, MovieRepositoryError> {
        self.bounded(async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let target = movies::table
                .filter(movies::id.eq(movie.id))
                .filter(movies::version.eq(movie.version));
            diesel::update(target)
                .set((
                    MovieChangeset {
                        title: &movie.title,
                        year: movie.year,
                        runtime: movie.runtime.minutes(),
                        genres: &movie.genres,
                    },
                    movies::version.eq(movies::version + 1),
                ))
                .returning(movies::version)
                .get_result::<i32>(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?
                .ok_or(MovieRepositoryError::EditConflict)
        })
        .await
    }

    async fn delete(&self, id: i64) -> Result<(), MovieRepositoryError> {
        if id < 1 {
            return Err(MovieRepositoryError::not_found(id));
        }
        self.bounded(async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let affected = diesel::delete(movies::table.find(id))
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            if affected == 1 {
                Ok(())
            } else {
                Err(MovieRepositoryError::not_found(id))
            }
        })
        .await
    }

    async fn search(
        &self,
        search: &MovieSearch,
    ) -> Result<(Vec<Movie>, u64), MovieRepositoryError> {
        self.bounded(async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let total: i64 = filtered(search)
                .select(count_star())
                .get_result(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            let rows = ordered(filtered(search), search)
                .select(MovieRow::as_select())
                .limit(search.page.limit())
                .offset(search.page.offset())
                .load::<MovieRow>(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            let total = u64::try_from(total)
                .map_err(|_| MovieRepositoryError::query("negative row count"))?;
            Ok((rows.into_iter().map(Movie::from).collect(), total))
        })
        .await
    }
}
