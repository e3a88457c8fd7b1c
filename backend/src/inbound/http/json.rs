//! Strict JSON request bodies.
//!
//! [`StrictJson`] reads at most [`BodyLimit`] bytes, requires exactly one
//! JSON document, rejects unknown keys (through `deny_unknown_fields` on the
//! target type) and reports the first problem found as a [`DecodeError`].
//! The document must be a JSON object; arrays and scalars are type errors
//! even when the target could be filled from them positionally.
//! Problems are detected in this order: size, emptiness, syntax, field
//! types and names, trailing content.

use std::future::Future;
use std::pin::Pin;

use actix_web::dev::Payload;
use actix_web::http::header::CONTENT_LENGTH;
use actix_web::{FromRequest, HttpRequest};
use futures_util::StreamExt;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::Error;

/// Default request body ceiling in bytes.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1_048_576;

/// Request body ceiling, registered as app data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyLimit(pub usize);

impl Default for BodyLimit {
    fn default() -> Self {
        Self(DEFAULT_MAX_BODY_BYTES)
    }
}

/// Why a request body could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The body exceeded the configured ceiling.
    #[error("body must not be larger than {limit} bytes")]
    BodyTooLarge { limit: usize },
    /// The body is not well-formed JSON. `offset` is absent when the input
    /// ended early.
    #[error("{}", malformed_message(.offset))]
    MalformedSyntax { offset: Option<usize> },
    /// A value had the wrong JSON type.
    #[error("{}", type_mismatch_message(.field, .offset))]
    TypeMismatch { field: Option<String>, offset: usize },
    /// The body named a field the target does not accept.
    #[error("body contains unknown key \"{field}\"")]
    UnknownField { field: String },
    /// The body was empty or whitespace.
    #[error("body must not be empty")]
    EmptyBody,
    /// More content followed the first JSON value.
    #[error("body must only contain a single JSON value")]
    TrailingContent,
    /// A field-level decoder failed with its own message.
    #[error("{message}")]
    Other { message: String },
}

fn malformed_message(offset: &Option<usize>) -> String {
    match offset {
        Some(offset) => format!("body contains badly-formed JSON (at character {offset})"),
        None => "body contains badly-formed JSON".to_owned(),
    }
}

fn type_mismatch_message(field: &Option<String>, offset: &usize) -> String {
    match field {
        Some(field) => format!("body contains incorrect JSON type for field \"{field}\""),
        None => format!("body contains incorrect JSON type (at character {offset})"),
    }
}

impl From<DecodeError> for Error {
    fn from(err: DecodeError) -> Self {
        Self::invalid_request(err.to_string())
    }
}

/// Byte offset of a 1-based `line`/`column` position.
fn byte_offset(body: &[u8], line: usize, column: usize) -> usize {
    let preceding: usize = body
        .split(|byte| *byte == b'\n')
        .take(line.saturating_sub(1))
        .map(|line| line.len() + 1)
        .sum();
    preceding + column
}

/// Drop serde_json's ` at line L column C` suffix.
fn without_position(message: &str) -> &str {
    message
        .rfind(" at line ")
        .and_then(|idx| message.get(..idx))
        .unwrap_or(message)
}

fn is_type_error(message: &str) -> bool {
    ["invalid type:", "invalid value:", "invalid length"]
        .iter()
        .any(|prefix| message.starts_with(prefix))
}

fn unknown_field(message: &str) -> Option<&str> {
    message
        .strip_prefix("unknown field `")
        .and_then(|rest| rest.split_once('`'))
        .map(|(name, _)| name)
}

fn syntax_error(err: &serde_json::Error, body: &[u8]) -> DecodeError {
    match err.classify() {
        Category::Eof => DecodeError::MalformedSyntax { offset: None },
        Category::Io => DecodeError::Other {
            message: without_position(&err.to_string()).to_owned(),
        },
        Category::Syntax | Category::Data => DecodeError::MalformedSyntax {
            offset: Some(byte_offset(body, err.line(), err.column())),
        },
    }
}

/// 1-based position of the first non-whitespace byte.
fn document_start(body: &[u8]) -> usize {
    body.iter()
        .position(|byte| !byte.is_ascii_whitespace())
        .map_or(1, |idx| idx + 1)
}

/// Top-level key whose value alone reproduces `message`.
///
/// Each key is decoded in isolation; an exact message match wins, otherwise
/// the first key failing with any type error is used.
fn locate_field<T: DeserializeOwned>(document: &Value, message: &str) -> Option<String> {
    let Value::Object(fields) = document else {
        return None;
    };
    let mut fallback = None;
    for (key, value) in fields {
        let single = Value::Object(Map::from_iter([(key.clone(), value.clone())]));
        let Err(err) = T::deserialize(single) else {
            continue;
        };
        let isolated = err.to_string();
        if isolated == message {
            return Some(key.clone());
        }
        if fallback.is_none() && is_type_error(&isolated) {
            fallback = Some(key.clone());
        }
    }
    fallback
}

fn data_error<T: DeserializeOwned>(
    err: &serde_json::Error,
    body: &[u8],
    document: &Value,
) -> DecodeError {
    if !matches!(err.classify(), Category::Data) {
        return syntax_error(err, body);
    }
    let full = err.to_string();
    let message = without_position(&full);
    if let Some(field) = unknown_field(message) {
        return DecodeError::UnknownField {
            field: field.to_owned(),
        };
    }
    if is_type_error(message) {
        return DecodeError::TypeMismatch {
            field: locate_field::<T>(document, message),
            offset: byte_offset(body, err.line(), err.column()),
        };
    }
    DecodeError::Other {
        message: message.to_owned(),
    }
}

/// Decode exactly one JSON document from `body` into `T`.
///
/// # Errors
///
/// Returns the first [`DecodeError`] detected.
///
/// # Examples
/// ```
/// use serde::Deserialize;
/// use yamda::inbound::http::json::{DecodeError, decode_strict};
///
/// #[derive(Debug, Deserialize)]
/// #[serde(deny_unknown_fields)]
/// struct Input {
///     title: Option<String>,
/// }
///
/// let err = decode_strict::<Input>(br#"{"title":"Moana"} {}"#).unwrap_err();
/// assert_eq!(err, DecodeError::TrailingContent);
/// ```
pub fn decode_strict<T: DeserializeOwned>(body: &[u8]) -> Result<T, DecodeError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(DecodeError::EmptyBody);
    }

    let mut reader = serde_json::Deserializer::from_slice(body);
    let document = Value::deserialize(&mut reader).map_err(|err| syntax_error(&err, body))?;
    let single_value = reader.end().is_ok();

    if !document.is_object() {
        return Err(DecodeError::TypeMismatch {
            field: None,
            offset: document_start(body),
        });
    }

    let mut typed_reader = serde_json::Deserializer::from_slice(body);
    let decoded =
        T::deserialize(&mut typed_reader).map_err(|err| data_error::<T>(&err, body, &document))?;

    if single_value {
        Ok(decoded)
    } else {
        Err(DecodeError::TrailingContent)
    }
}

async fn read_limited(payload: &mut Payload, limit: usize) -> Result<Vec<u8>, DecodeError> {
    let mut body = Vec::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|err| DecodeError::Other {
            message: err.to_string(),
        })?;
        if body.len() + chunk.len() > limit {
            return Err(DecodeError::BodyTooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Extractor for strictly decoded JSON bodies.
///
/// # Examples
/// ```
/// use actix_web::{HttpResponse, post};
/// use serde::Deserialize;
/// use yamda::inbound::http::json::StrictJson;
///
/// #[derive(Deserialize)]
/// #[serde(deny_unknown_fields)]
/// struct Ping {
///     message: Option<String>,
/// }
///
/// #[post("/ping")]
/// async fn ping(body: StrictJson<Ping>) -> HttpResponse {
///     let _ = body.into_inner().message;
///     HttpResponse::NoContent().finish()
/// }
/// ```
#[derive(Debug)]
pub struct StrictJson<T>(pub T);

impl<T> StrictJson<T> {
    /// Unwrap the decoded value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: DeserializeOwned + 'static> FromRequest for StrictJson<T> {
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let limit = req.app_data::<BodyLimit>().copied().unwrap_or_default().0;
        let declared = req
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<usize>().ok());
        let mut payload = payload.take();

        Box::pin(async move {
            if declared.is_some_and(|length| length > limit) {
                return Err(DecodeError::BodyTooLarge { limit }.into());
            }
            let body = read_limited(&mut payload, limit).await?;
            Ok(Self(decode_strict(&body)?))
        })
    }
}

#[cfg(test)]
mod tests;
