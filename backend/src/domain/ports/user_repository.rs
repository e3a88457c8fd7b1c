//! Port for user account persistence.
//!
//! Email addresses are unique. Adapters report a clash as
//! [`UserRepositoryError::DuplicateEmail`] so services can turn it into a
//! field-level validation failure.

use async_trait::async_trait;

use crate::domain::user::{NewUser, User};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// A connection could not be checked out of the pool.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The call did not finish within the configured deadline.
        Timeout { millis: u64 } => "user repository call timed out after {millis}ms",
        /// Another account already uses the email address.
        DuplicateEmail => "a user with this email address already exists",
        /// No account matched the lookup.
        NotFound => "user not found",
        /// The stored version moved on since the caller read it.
        EditConflict => "user was modified concurrently",
    }
}

/// Storage contract for user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert an account, returning it with id, timestamp and version `1`.
    async fn insert(&self, user: &NewUser) -> Result<User, UserRepositoryError>;

    /// Fetch the account registered under `email`.
    async fn get_by_email(&self, email: &str) -> Result<User, UserRepositoryError>;

    /// Write `user` if its version is current, returning the new version.
    async fn update(&self, user: &User) -> Result<i32, UserRepositoryError>;

    /// Delete an account. Identifiers below `1` are never found.
    async fn delete(&self, id: i64) -> Result<(), UserRepositoryError>;
}

#[cfg(any(test, feature = "test-support"))]
mod in_memory {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::{UserRepository, UserRepositoryError};
    use crate::domain::user::{NewUser, User};

    /// Account store kept in process memory.
    #[derive(Debug, Default)]
    pub struct InMemoryUserRepository {
        users: Mutex<Vec<User>>,
    }

    impl InMemoryUserRepository {
        fn with_users<T>(&self, f: impl FnOnce(&mut Vec<User>) -> T) -> T {
            let mut guard = self.users.lock().unwrap_or_else(|err| err.into_inner());
            f(&mut guard)
        }
    }

    #[async_trait]
    impl UserRepository for InMemoryUserRepository {
        async fn insert(&self, user: &NewUser) -> Result<User, UserRepositoryError> {
            self.with_users(|users| {
                if users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
                    return Err(UserRepositoryError::DuplicateEmail);
                }
                let stored = User {
                    id: users.iter().map(|u| u.id).max().unwrap_or(0) + 1,
                    created_at: Some(Utc::now()),
                    name: user.name.clone(),
                    email: user.email.clone(),
                    password: user.password.clone(),
                    activated: user.activated,
                    version: 1,
                };
                users.push(stored.clone());
                Ok(stored)
            })
        }

        async fn get_by_email(&self, email: &str) -> Result<User, UserRepositoryError> {
            self.with_users(|users| {
                users
                    .iter()
                    .find(|u| u.email.eq_ignore_ascii_case(email))
                    .cloned()
            })
            .ok_or(UserRepositoryError::NotFound)
        }

        async fn update(&self, user: &User) -> Result<i32, UserRepositoryError> {
            self.with_users(|users| {
                if users
                    .iter()
                    .any(|u| u.id != user.id && u.email.eq_ignore_ascii_case(&user.email))
                {
                    return Err(UserRepositoryError::DuplicateEmail);
                }
                let stored = users
                    .iter_mut()
                    .find(|u| u.id == user.id && u.version == user.version)
                    .ok_or(UserRepositoryError::EditConflict)?;
                stored.name.clone_from(&user.name);
                stored.email.clone_from(&user.email);
                stored.password = user.password.clone();
                stored.activated = user.activated;
                stored.version += 1;
                Ok(stored.version)
            })
        }

        async fn delete(&self, id: i64) -> Result<(), UserRepositoryError> {
            self.with_users(|users| {
                let before = users.len();
                users.retain(|u| u.id != id);
                if users.len() == before {
                    Err(UserRepositoryError::NotFound)
                } else {
                    Ok(())
                }
            })
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use in_memory::InMemoryUserRepository;
