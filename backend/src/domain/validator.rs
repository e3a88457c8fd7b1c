//! Field-level validation accumulator.
//!
//! A [`Validator`] collects at most one message per field: the first failure
//! recorded for a field wins and later ones are ignored. Messages are kept in
//! a [`BTreeMap`] so the rendered error object has a stable key order.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::hash::Hash;

use regex::Regex;

/// Accumulates per-field validation messages for a single validation pass.
///
/// # Examples
/// ```
/// use yamda::domain::Validator;
///
/// let mut v = Validator::new();
/// v.check(false, "title", "must be provided");
/// v.check(false, "title", "must not be empty or more than 500 bytes long");
/// assert!(!v.is_valid());
/// let errors = v.into_errors();
/// assert_eq!(errors.get("title"), Some("must be provided"));
/// ```
#[derive(Debug, Default)]
pub struct Validator {
    errors: BTreeMap<String, String>,
}

impl Validator {
    /// Empty validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when no failures have been recorded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record `message` for `field` unless the field already has one.
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_insert_with(|| message.into());
    }

    /// Record `message` for `field` when `ok` is false.
    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add_error(field, message);
        }
    }

    /// `true` when `field` already carries a message.
    #[must_use]
    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Consume the validator, returning whatever was recorded.
    #[must_use]
    pub fn into_errors(self) -> ValidationErrors {
        ValidationErrors(self.errors)
    }

    /// Consume the validator, failing when anything was recorded.
    ///
    /// # Errors
    ///
    /// Returns the recorded [`ValidationErrors`] when the pass failed.
    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(self.into_errors())
        }
    }
}

/// Ordered `field -> message` map produced by a failed validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    /// Message recorded for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` when no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(field, message)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Underlying map.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// `true` when `value` matches `pattern`.
#[must_use]
pub fn matches(value: &str, pattern: &Regex) -> bool {
    pattern.is_match(value)
}

/// `true` when `value` is one of `permitted`.
#[must_use]
pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.contains(value)
}

/// `true` when every entry of `values` is distinct.
#[must_use]
pub fn unique<T: Eq + Hash>(values: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().all(|value| seen.insert(value))
}
