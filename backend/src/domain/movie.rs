//! Movie catalogue entries and their validation rules.
//!
//! Requests carry a [`MovieDraft`] whose fields may be absent. Validation
//! turns a draft into [`MovieFields`], the set of values every stored movie
//! satisfies. Partial updates merge a [`MoviePatch`] onto a stored [`Movie`]
//! and re-run the same rules over the result.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::runtime::Runtime;
use crate::domain::validator::{ValidationErrors, Validator, unique};

/// Earliest accepted release year is the one after this.
pub const EARLIEST_YEAR: i32 = 1888;
/// Longest accepted title, in bytes.
pub const MAX_TITLE_BYTES: usize = 500;
/// Largest number of genres a movie may carry.
pub const MAX_GENRES: usize = 5;

/// A stored movie.
///
/// `created_at` is server-assigned and never serialised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Movie {
    /// Server-assigned identifier.
    #[schema(example = 1)]
    pub id: i64,
    /// Insertion timestamp.
    #[serde(skip)]
    #[schema(ignore)]
    pub created_at: DateTime<Utc>,
    /// Display title.
    #[schema(example = "Casablanca")]
    pub title: String,
    /// Running time.
    #[schema(value_type = String, example = "102 mins")]
    pub runtime: Runtime,
    /// Distinct genre labels.
    #[schema(example = json!(["drama", "romance"]))]
    pub genres: Vec<String>,
    /// Release year.
    #[schema(example = 1942)]
    pub year: i32,
    /// Optimistic concurrency token.
    #[schema(example = 1)]
    pub version: i32,
}

impl Movie {
    /// Replace the editable fields with validated values.
    pub fn set_fields(&mut self, fields: MovieFields) {
        let MovieFields {
            title,
            year,
            runtime,
            genres,
        } = fields;
        self.title = title;
        self.year = year;
        self.runtime = runtime;
        self.genres = genres;
    }

    /// Editable fields as a fully populated draft.
    #[must_use]
    pub fn to_draft(&self) -> MovieDraft {
        MovieDraft {
            title: Some(self.title.clone()),
            year: Some(self.year),
            runtime: Some(self.runtime),
            genres: Some(self.genres.clone()),
        }
    }
}

/// Editable movie fields that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieFields {
    /// Trimmed title.
    pub title: String,
    /// Release year.
    pub year: i32,
    /// Running time.
    pub runtime: Runtime,
    /// Distinct genre labels.
    pub genres: Vec<String>,
}

/// Unvalidated movie fields as received from a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieDraft {
    /// Requested title.
    pub title: Option<String>,
    /// Requested release year.
    pub year: Option<i32>,
    /// Requested running time.
    pub runtime: Option<Runtime>,
    /// Requested genres.
    pub genres: Option<Vec<String>>,
}

impl MovieDraft {
    /// Run every movie rule, recording failures in `v`.
    ///
    /// All fields are checked so several can fail together. `current_year`
    /// bounds the release year from above.
    pub fn check(&self, v: &mut Validator, current_year: i32) {
        match &self.title {
            None => v.add_error("title", "must be provided"),
            Some(title) => {
                let trimmed = title.trim();
                v.check(
                    !trimmed.is_empty() && trimmed.len() <= MAX_TITLE_BYTES,
                    "title",
                    "must not be empty or more than 500 bytes long",
                );
            }
        }

        match self.year {
            None => v.add_error("year", "must be provided"),
            Some(year) => {
                v.check(year > EARLIEST_YEAR, "year", "must be greater than 1888");
                v.check(year <= current_year, "year", "must not be in the future");
            }
        }

        match self.runtime {
            None => v.add_error("runtime", "must be provided"),
            Some(runtime) => {
                v.check(
                    runtime.minutes() > 0,
                    "runtime",
                    "must be a positive integer",
                );
            }
        }

        match &self.genres {
            None => v.add_error("genres", "must be provided"),
            Some(genres) => {
                v.check(
                    !genres.is_empty(),
                    "genres",
                    "must contain at least 1 genre",
                );
                v.check(
                    genres.len() <= MAX_GENRES,
                    "genres",
                    "must not contain more than 5 genres",
                );
                v.check(
                    unique(genres),
                    "genres",
                    "must not contain duplicate values",
                );
                v.check(
                    genres.iter().all(|genre| !genre.trim().is_empty()),
                    "genres",
                    "must not contain empty values",
                );
            }
        }
    }

    /// Validate the draft on its own.
    ///
    /// # Errors
    ///
    /// Returns every failing field when any rule is violated.
    ///
    /// # Examples
    /// ```
    /// use yamda::domain::{MovieDraft, Runtime};
    ///
    /// let draft = MovieDraft {
    ///     title: Some("Casablanca".to_owned()),
    ///     year: Some(1942),
    ///     runtime: Some(Runtime::new(102)),
    ///     genres: Some(vec!["drama".to_owned()]),
    /// };
    /// let fields = draft.validate(2024).expect("valid movie");
    /// assert_eq!(fields.title, "Casablanca");
    /// ```
    pub fn validate(self, current_year: i32) -> Result<MovieFields, ValidationErrors> {
        let mut v = Validator::new();
        self.check(&mut v, current_year);
        v.finish()?;
        self.into_fields().ok_or_else(ValidationErrors::default)
    }

    /// Populated fields, once [`Self::check`] recorded nothing.
    fn into_fields(self) -> Option<MovieFields> {
        Some(MovieFields {
            title: self.title?.trim().to_owned(),
            year: self.year?,
            runtime: self.runtime?,
            genres: self.genres?,
        })
    }
}

/// Fields to change on an existing movie, plus an optional expected version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoviePatch {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement release year.
    pub year: Option<i32>,
    /// Replacement running time.
    pub runtime: Option<Runtime>,
    /// Replacement genres.
    pub genres: Option<Vec<String>>,
    /// Version the client last read; the write fails if the row moved on.
    pub version: Option<i32>,
}

impl MoviePatch {
    /// Overlay the provided fields onto `movie`.
    #[must_use]
    pub fn merge_onto(self, movie: &Movie) -> MovieDraft {
        let base = movie.to_draft();
        MovieDraft {
            title: self.title.or(base.title),
            year: self.year.or(base.year),
            runtime: self.runtime.or(base.runtime),
            genres: self.genres.or(base.genres),
        }
    }
}

/// Validate the identifier supplied in a body-identified update.
///
/// # Errors
///
/// Returns an `id` failure when the identifier is absent or not positive.
pub fn validate_movie_id(id: Option<i64>) -> Result<i64, ValidationErrors> {
    match id {
        Some(id) if id > 0 => Ok(id),
        _ => {
            let mut v = Validator::new();
            v.add_error("id", "must be provided and bigger than 0");
            Err(v.into_errors())
        }
    }
}
