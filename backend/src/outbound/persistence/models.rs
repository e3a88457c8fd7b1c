//! Diesel row structs.
//!
//! These are persistence details and never leave this module tree; the
//! repositories convert them to and from domain types.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{movies, users};
use crate::domain::{Movie, Password, Runtime, User};

/// Row read from `movies`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = movies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MovieRow {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub year: i32,
    pub runtime: i32,
    pub genres: Vec<String>,
    pub version: i32,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Self {
            id: row.id,
            created_at: row.created_at,
            title: row.title,
            runtime: Runtime::new(row.runtime),
            genres: row.genres,
            year: row.year,
            version: row.version,
        }
    }
}

/// Values written by an insert into `movies`.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = movies)]
pub(crate) struct NewMovieRow<'a> {
    pub title: &'a str,
    pub year: i32,
    pub runtime: i32,
    pub genres: &'a [String],
}

/// Editable columns written by a conditional update of `movies`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = movies)]
pub(crate) struct MovieChangeset<'a> {
    pub title: &'a str,
    pub year: i32,
    pub runtime: i32,
    pub genres: &'a [String],
}

/// Row read from `users`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub activated: bool,
    pub version: i32,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            created_at: Some(row.created_at),
            name: row.name,
            email: row.email,
            password: Password::from_hash(row.password_hash),
            activated: row.activated,
            version: row.version,
        }
    }
}

/// Values written by an insert into `users`.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub activated: bool,
}

/// Editable columns written by a conditional update of `users`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub activated: bool,
}
