//! Query-string readers.
//!
//! Absent values fall back to defaults. Unparsable integers are recorded in
//! the caller's [`Validator`] so they surface with the rest of the filter
//! failures instead of aborting the request early.

use std::collections::HashMap;

use crate::domain::filters::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, DEFAULT_SORT, Filters};
use crate::domain::{MovieListQuery, Validator};

/// Raw query-string parameters.
pub type QueryParams = HashMap<String, String>;

/// Read `key`, or `default` when it is absent or empty.
pub fn read_string(params: &QueryParams, key: &str, default: &str) -> String {
    match params.get(key) {
        Some(value) if !value.is_empty() => value.clone(),
        _ => default.to_owned(),
    }
}

/// Read `key` as an integer, or `default` when absent or empty.
///
/// A value that does not parse records `must be an integer value` under
/// `key` and yields `default`.
pub fn read_int(params: &QueryParams, key: &str, default: i64, v: &mut Validator) -> i64 {
    match params.get(key).filter(|value| !value.is_empty()) {
        None => default,
        Some(value) => value.parse().unwrap_or_else(|_| {
            v.add_error(key, "must be an integer value");
            default
        }),
    }
}

/// Read the movie list parameters along with any parse failures.
pub fn movie_list_query(params: &QueryParams) -> (MovieListQuery, Validator) {
    let mut v = Validator::new();
    let query = MovieListQuery {
        title: read_string(params, "title", ""),
        genres: read_string(params, "genres", ""),
        filters: Filters {
            page: read_int(params, "page", DEFAULT_PAGE, &mut v),
            page_size: read_int(params, "page_size", DEFAULT_PAGE_SIZE, &mut v),
            sort: read_string(params, "sort", DEFAULT_SORT),
        },
    };
    (query, v)
}
