//! Domain-level error type.
//!
//! The error is transport agnostic. The HTTP adapter maps each [`ErrorCode`]
//! to a status code and a problem document; other adapters are free to do
//! the same with their own envelopes.

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::TraceId;
use crate::domain::validator::ValidationErrors;

/// Header carrying the request trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

/// Stable failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// The request could not be decoded.
    InvalidRequest,
    /// The request decoded but one or more fields failed validation.
    FailedValidation,
    /// The requested resource does not exist.
    NotFound,
    /// An optimistic concurrency check rejected the write.
    EditConflict,
    /// An unexpected failure; details are logged, never returned.
    InternalError,
}

/// Domain error payload.
///
/// Construction captures the trace identifier of the current request, when
/// one is in scope, so logs and responses can be correlated.
///
/// # Examples
/// ```
/// use yamda::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("movie with id 7 not found");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err.message(), "movie with id 7 not found");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    code: ErrorCode,
    message: String,
    errors: Option<BTreeMap<String, String>>,
    trace_id: Option<String>,
}

impl Error {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            errors: None,
            trace_id: TraceId::current().map(|id| id.to_string()),
        }
    }

    /// Stable failure category.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Per-field validation messages, present for
    /// [`ErrorCode::FailedValidation`].
    #[must_use]
    pub const fn errors(&self) -> Option<&BTreeMap<String, String>> {
        self.errors.as_ref()
    }

    /// Trace identifier captured when the error was built.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Attach a trace identifier explicitly.
    #[must_use]
    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Build a [`ErrorCode::FailedValidation`] error from field messages.
    ///
    /// # Examples
    /// ```
    /// use yamda::domain::{Error, ErrorCode, Validator};
    ///
    /// let mut validator = Validator::new();
    /// validator.add_error("title", "must be provided");
    /// let err = Error::failed_validation(validator.into_errors());
    /// assert_eq!(err.code(), ErrorCode::FailedValidation);
    /// assert_eq!(
    ///     err.errors().and_then(|e| e.get("title")).map(String::as_str),
    ///     Some("must be provided"),
    /// );
    /// ```
    pub fn failed_validation(errors: ValidationErrors) -> Self {
        let mut error = Self::new(ErrorCode::FailedValidation, "input validations failed");
        error.errors = Some(errors.into_inner());
        error
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::EditConflict`].
    pub fn edit_conflict() -> Self {
        Self::new(
            ErrorCode::EditConflict,
            "unable to update the record due to an edit conflict, please try again",
        )
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Self::failed_validation(errors)
    }
}
