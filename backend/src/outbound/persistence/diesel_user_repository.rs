//! PostgreSQL-backed `UserRepository` using Diesel.
//!
//! Email uniqueness is enforced by the `users_email_key` index on
//! `lower(email)`; a violation becomes `DuplicateEmail`.

use std::future::Future;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::user::{NewUser, User};

use super::diesel_basic_error_mapping::{StoreFailure, classify_diesel_error, classify_pool_error};
use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

diesel::define_sql_function! {
    /// PostgreSQL `lower(text)`.
    fn lower(value: Text) -> Text;
}

/// Index guarding email uniqueness.
const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn bounded<T, F>(&self, op: F) -> Result<T, UserRepositoryError>
    where
        F: Future<Output = Result<T, UserRepositoryError>>,
    {
        self.pool
            .with_deadline(op)
            .await
            .unwrap_or_else(|| Err(UserRepositoryError::timeout(self.pool.query_timeout_millis())))
    }
}

fn map_failure(failure: StoreFailure) -> UserRepositoryError {
    match failure {
        StoreFailure::Connection(message) => UserRepositoryError::connection(message),
        StoreFailure::UniqueViolation { constraint }
            if constraint.as_deref() == Some(EMAIL_CONSTRAINT) =>
        {
            UserRepositoryError::DuplicateEmail
        }
        StoreFailure::UniqueViolation { constraint } => UserRepositoryError::query(format!(
            "unique constraint violated: {}",
            constraint.as_deref().unwrap_or("unknown")
        )),
        StoreFailure::Query(message) => UserRepositoryError::query(message),
    }
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    map_failure(classify_diesel_error(error))
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    map_failure(classify_pool_error(error))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<User, UserRepositoryError> {
        self.bounded(async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let row = diesel::insert_into(users::table)
                .values(&NewUserRow {
                    name: &user.name,
                    email: &user.email,
                    password_hash: user.password.hash(),
                    activated: user.activated,
                })
                .returning(UserRow::as_returning())
                .get_result::<UserRow>(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            Ok(row.into())
        })
        .await
    }

    async fn get_by_email(&self, email: &str) -> Result<User, UserRepositoryError> {
        self.bounded(async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            users::table
                .filter(lower(users::email).eq(email.to_lowercase()))
                .select(UserRow::as_select())
                .first::<UserRow>(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?
                .map(User::from)
                .ok_or(UserRepositoryError::NotFound)
        })
        .await
    }

    async fn update(&self, user: &User) -> Result<i32, UserRepositoryError> {
        self.bounded(async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let target = users::table
                .filter(users::id.eq(user.id))
                .filter(users::version.eq(user.version));
            diesel::update(target)
                .set((
                    UserChangeset {
                        name: &user.name,
                        email: &user.email,
                        password_hash: user.password.hash(),
                        activated: user.activated,
                    },
                    users::version.eq(users::version + 1),
                ))
                .returning(users::version)
                .get_result::<i32>(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?
                .ok_or(UserRepositoryError::EditConflict)
        })
        .await
    }

    async fn delete(&self, id: i64) -> Result<(), UserRepositoryError> {
        if id < 1 {
            return Err(UserRepositoryError::NotFound);
        }
        self.bounded(async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let affected = diesel::delete(users::table.find(id))
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            if affected == 1 {
                Ok(())
            } else {
                Err(UserRepositoryError::NotFound)
            }
        })
        .await
    }
}
