//! Account registration.

use std::sync::Arc;

use tracing::{error, info};

use crate::domain::password::{Password, PasswordError};
use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::user::{NewUser, User, UserRegistration};
use crate::domain::validator::Validator;
use crate::domain::{Error, TraceId};

fn map_user_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::DuplicateEmail => {
            let mut v = Validator::new();
            v.add_error("email", "a user with this email address already exists");
            Error::failed_validation(v.into_errors())
        }
        UserRepositoryError::NotFound => Error::not_found("user not found"),
        UserRepositoryError::EditConflict => Error::edit_conflict(),
        other @ (UserRepositoryError::Connection { .. }
        | UserRepositoryError::Query { .. }
        | UserRepositoryError::Timeout { .. }) => Error::internal(other.to_string()),
    }
}

/// Account operations.
#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    /// Build the service over a repository.
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// Validate, hash and store a new account.
    ///
    /// Hashing runs on a blocking thread so it does not stall the executor.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input or a taken email address,
    /// and an internal error when hashing or storage fails.
    pub async fn register(&self, registration: UserRegistration) -> Result<User, Error> {
        let mut v = Validator::new();
        registration.check(&mut v);
        v.finish()?;

        let UserRegistration {
            name,
            email,
            password,
        } = registration;
        let (Some(name), Some(email), Some(plaintext)) = (name, email, password) else {
            return Err(Error::internal("registration fields escaped validation"));
        };

        let trace_id = TraceId::current();
        let password = tokio::task::spawn_blocking(move || Password::from_plaintext(&plaintext))
            .await
            .map_err(|err| {
                error!(error = %err, ?trace_id, "password hashing task failed");
                Error::internal("password hashing task failed")
            })?
            .map_err(|err: PasswordError| Error::internal(err.to_string()))?;

        let user = self
            .repository
            .insert(&NewUser {
                name,
                email,
                password,
                activated: false,
            })
            .await
            .map_err(map_user_repository_error)?;
        info!(user_id = user.id, "user registered");
        Ok(user)
    }
}
