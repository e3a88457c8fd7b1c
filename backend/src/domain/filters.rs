//! List filters: paging bounds and sort allow-lists.
//!
//! Raw query values are validated into a [`MovieSearch`], which carries only
//! values the persistence layer can use directly.

use pagination::{PageRequest, SortDirection, SortKey};
use tracing::error;

use crate::domain::Error;
use crate::domain::validator::{Validator, permitted_value};

/// Largest page number accepted.
pub const MAX_PAGE: i64 = 10_000_000;
/// Largest page size accepted.
pub const MAX_PAGE_SIZE: i64 = 100;
/// Page returned when none is requested.
pub const DEFAULT_PAGE: i64 = 1;
/// Page size used when none is requested.
pub const DEFAULT_PAGE_SIZE: i64 = 20;
/// Sort key used when none is requested.
pub const DEFAULT_SORT: &str = "id";

/// Sort keys accepted by the movie list endpoint.
pub const MOVIE_SORT_SAFELIST: [&str; 8] = [
    "id", "title", "year", "runtime", "-id", "-title", "-year", "-runtime",
];

/// Paging and sort values as requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    /// One-based page number.
    pub page: i64,
    /// Records per page.
    pub page_size: i64,
    /// Sort key, optionally prefixed with `-`.
    pub sort: String,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            sort: DEFAULT_SORT.to_owned(),
        }
    }
}

impl Filters {
    /// Record paging and sort failures in `v`.
    pub fn check(&self, v: &mut Validator, safelist: &[&str]) {
        v.check(self.page > 0, "page", "must be greater than zero");
        v.check(
            self.page <= MAX_PAGE,
            "page",
            "must be a maximum of 10 million",
        );
        v.check(self.page_size > 0, "page_size", "must be greater than zero");
        v.check(
            self.page_size <= MAX_PAGE_SIZE,
            "page_size",
            "must be a maximum of 100",
        );
        v.check(
            permitted_value(&self.sort.as_str(), safelist),
            "sort",
            "invalid sort value",
        );
    }

    fn page_request(&self) -> Result<PageRequest, Error> {
        let page = u32::try_from(self.page).ok();
        let page_size = u32::try_from(self.page_size).ok();
        page.zip(page_size)
            .and_then(|(page, size)| PageRequest::new(page, size).ok())
            .ok_or_else(|| {
                error!(
                    page = self.page,
                    page_size = self.page_size,
                    "unvalidated page bounds"
                );
                Error::internal("page bounds escaped validation")
            })
    }
}

/// Column a movie list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieSortColumn {
    /// Identifier.
    Id,
    /// Title.
    Title,
    /// Release year.
    Year,
    /// Running time.
    Runtime,
}

/// Resolved movie ordering; ties are always broken by ascending id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovieSort {
    /// Primary column.
    pub column: MovieSortColumn,
    /// Primary direction.
    pub direction: SortDirection,
}

impl MovieSort {
    /// Resolve a validated sort key.
    ///
    /// A key outside the allow-list is a programming error: it is logged and
    /// reported as an internal error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::internal`] for unknown keys.
    pub fn resolve(sort: &str) -> Result<Self, Error> {
        let unknown = || {
            error!(sort, "sort key escaped the allow-list");
            Error::internal(format!("unsafe sort parameter: {sort}"))
        };
        let key = SortKey::parse(sort, &MOVIE_SORT_SAFELIST).ok_or_else(unknown)?;
        let column = match key.column {
            "id" => MovieSortColumn::Id,
            "title" => MovieSortColumn::Title,
            "year" => MovieSortColumn::Year,
            "runtime" => MovieSortColumn::Runtime,
            _ => return Err(unknown()),
        };
        Ok(Self {
            column,
            direction: key.direction,
        })
    }
}

/// Movie list query as read from the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieListQuery {
    /// Case-insensitive title substring; empty matches everything.
    pub title: String,
    /// Genre substring; empty matches everything.
    pub genres: String,
    /// Paging and sort.
    pub filters: Filters,
}

/// Validated movie search handed to the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieSearch {
    /// Case-insensitive title substring.
    pub title: String,
    /// Genre substring.
    pub genres: String,
    /// Page window.
    pub page: PageRequest,
    /// Ordering.
    pub sort: MovieSort,
}

impl MovieListQuery {
    /// Finish validation started by the query reader.
    ///
    /// `v` may already hold failures, such as unparsable integers; those are
    /// reported together with any filter failures.
    ///
    /// # Errors
    ///
    /// Returns a validation error when any filter is out of range and an
    /// internal error if a validated value cannot be resolved.
    pub fn into_search(self, mut v: Validator) -> Result<MovieSearch, Error> {
        self.filters.check(&mut v, &MOVIE_SORT_SAFELIST);
        v.finish()?;
        Ok(MovieSearch {
            page: self.filters.page_request()?,
            sort: MovieSort::resolve(&self.filters.sort)?,
            title: self.title,
            genres: self.genres,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Filter bounds and sort resolution.

    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    fn query(page: i64, page_size: i64, sort: &str) -> MovieListQuery {
        MovieListQuery {
            filters: Filters {
                page,
                page_size,
                sort: sort.to_owned(),
            },
            ..MovieListQuery::default()
        }
    }

    #[rstest]
    fn defaults_resolve_to_first_page_by_id() {
        let search = MovieListQuery::default()
            .into_search(Validator::new())
            .expect("defaults are valid");
        assert_eq!(search.page.page(), 1);
        assert_eq!(search.page.page_size(), 20);
        assert_eq!(search.sort.column, MovieSortColumn::Id);
        assert_eq!(search.sort.direction, SortDirection::Ascending);
    }

    #[rstest]
    #[case(0, 20, "page", "must be greater than zero")]
    #[case(10_000_001, 20, "page", "must be a maximum of 10 million")]
    #[case(1, 0, "page_size", "must be greater than zero")]
    #[case(1, 101, "page_size", "must be a maximum of 100")]
    fn out_of_range_paging(
        #[case] page: i64,
        #[case] page_size: i64,
        #[case] field: &str,
        #[case] message: &str,
    ) {
        let error = query(page, page_size, "id")
            .into_search(Validator::new())
            .expect_err("paging should fail");
        assert_eq!(error.code(), ErrorCode::FailedValidation);
        let errors = error.errors().expect("errors present");
        assert_eq!(errors.get(field).map(String::as_str), Some(message));
    }

    #[rstest]
    fn max_bounds_are_inclusive() {
        let search = query(MAX_PAGE, MAX_PAGE_SIZE, "-year")
            .into_search(Validator::new())
            .expect("bounds are valid");
        assert_eq!(search.page.page_size(), 100);
        assert_eq!(search.sort.column, MovieSortColumn::Year);
        assert_eq!(search.sort.direction, SortDirection::Descending);
    }

    #[rstest]
    #[case("rating")]
    #[case("Title")]
    #[case("-")]
    fn unknown_sort_is_a_validation_error(#[case] sort: &str) {
        let error = query(1, 20, sort)
            .into_search(Validator::new())
            .expect_err("sort should fail");
        let errors = error.errors().expect("errors present");
        assert_eq!(
            errors.get("sort").map(String::as_str),
            Some("invalid sort value")
        );
    }

    #[rstest]
    fn earlier_reader_failures_are_kept() {
        let mut v = Validator::new();
        v.add_error("page", "must be an integer value");
        let error = query(1, 500, "id")
            .into_search(v)
            .expect_err("should fail");
        let errors = error.errors().expect("errors present");
        assert_eq!(
            errors.get("page").map(String::as_str),
            Some("must be an integer value")
        );
        assert!(errors.contains_key("page_size"));
    }

    #[rstest]
    fn resolve_rejects_keys_outside_allow_list() {
        let error = MovieSort::resolve("director").expect_err("should fail");
        assert_eq!(error.code(), ErrorCode::InternalError);
    }

    #[rstest]
    #[case("title", MovieSortColumn::Title, SortDirection::Ascending)]
    #[case("-runtime", MovieSortColumn::Runtime, SortDirection::Descending)]
    #[case("-id", MovieSortColumn::Id, SortDirection::Descending)]
    fn resolve_maps_columns(
        #[case] sort: &str,
        #[case] column: MovieSortColumn,
        #[case] direction: SortDirection,
    ) {
        let resolved = MovieSort::resolve(sort).expect("allowed key");
        assert_eq!(resolved, MovieSort { column, direction });
    }
}
