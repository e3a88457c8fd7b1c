//! HTTP inbound adapter exposing the `/v1` REST endpoints.

pub mod error;
pub mod json;
pub mod movies;
pub mod query;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

pub use error::ApiResult;
