//! HTTP adapter mapping for domain errors.
//!
//! Domain errors leave the service as `application/problem+json` documents.
//! Internal failures are logged in full and redacted to a generic detail.

use std::collections::BTreeMap;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Media type of every error response.
pub const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";

/// Detail returned in place of internal error messages.
pub const INTERNAL_DETAIL: &str =
    "the server encountered a problem and could not process your request";

/// Problem document returned for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProblemBody {
    /// Short summary of the failure category.
    #[schema(example = "input validations failed")]
    pub title: String,
    /// HTTP status code, repeated for clients that only see the body.
    #[schema(example = 422)]
    pub status: u16,
    /// Human-readable explanation.
    #[schema(example = "")]
    pub detail: String,
    /// Per-field validation messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::FailedValidation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::EditConflict => StatusCode::CONFLICT,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn title_for(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::InvalidRequest => "bad request",
        ErrorCode::FailedValidation => "input validations failed",
        ErrorCode::NotFound => "resource not found",
        ErrorCode::EditConflict => "edit conflict",
        ErrorCode::InternalError => "internal server error",
    }
}

fn problem_for(error: &Error) -> ProblemBody {
    let detail = match error.code() {
        ErrorCode::InternalError => INTERNAL_DETAIL.to_owned(),
        ErrorCode::FailedValidation => String::new(),
        _ => error.message().to_owned(),
    };
    ProblemBody {
        title: title_for(error.code()).to_owned(),
        status: status_for(error.code()).as_u16(),
        detail,
        errors: error.errors().cloned(),
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(self.code(), ErrorCode::InternalError) {
            error!(
                trace_id = self.trace_id().unwrap_or_default(),
                error = %self.message(),
                "request failed"
            );
        }

        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder
            .content_type(PROBLEM_CONTENT_TYPE)
            .json(problem_for(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        Error::internal(format!("actix error promoted to domain error: {err}"))
    }
}

/// Problem response for requests that match no route.
pub async fn route_not_found() -> HttpResponse {
    Error::not_found("the requested resource could not be found").error_response()
}
