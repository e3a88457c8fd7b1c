//! Account credential.
//!
//! A [`Password`] always holds an Argon2id PHC hash. It is built either from
//! a plaintext, which is length-checked and hashed immediately, or from a
//! hash read back from storage. There is no state without a hash.

use std::fmt;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use thiserror::Error;

use crate::domain::validator::Validator;

/// Shortest accepted plaintext, in bytes.
pub const MIN_PASSWORD_BYTES: usize = 8;
/// Longest accepted plaintext, in bytes.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Failures raised while building or checking a [`Password`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordError {
    /// Plaintext shorter than [`MIN_PASSWORD_BYTES`].
    #[error("password must be at least 8 bytes long")]
    TooShort,
    /// Plaintext longer than [`MAX_PASSWORD_BYTES`].
    #[error("password must not be more than 72 bytes long")]
    TooLong,
    /// The hasher rejected its input or a stored hash was malformed.
    #[error("password hashing failed: {message}")]
    Hash {
        /// Underlying hasher message.
        message: String,
    },
}

impl From<password_hash::Error> for PasswordError {
    fn from(err: password_hash::Error) -> Self {
        Self::Hash {
            message: err.to_string(),
        }
    }
}

/// Record plaintext password failures under the `password` field.
pub fn check_plaintext(v: &mut Validator, plaintext: Option<&str>) {
    match plaintext {
        None | Some("") => v.add_error("password", "must be provided"),
        Some(plaintext) => {
            v.check(
                plaintext.len() >= MIN_PASSWORD_BYTES,
                "password",
                "must be at least 8 bytes long",
            );
            v.check(
                plaintext.len() <= MAX_PASSWORD_BYTES,
                "password",
                "must not be more than 72 bytes long",
            );
        }
    }
}

/// Hashed account password.
///
/// # Examples
/// ```
/// use yamda::domain::Password;
///
/// let password = Password::from_plaintext("pa55word").expect("hash password");
/// assert!(password.matches("pa55word").expect("verify"));
/// assert!(!password.matches("wrong-password").expect("verify"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Password {
    hash: String,
}

impl Password {
    /// Check the length of `plaintext` and hash it with a fresh salt.
    ///
    /// Hashing is CPU bound; async callers should run it on a blocking
    /// thread.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordError::TooShort`] or [`PasswordError::TooLong`] for
    /// out-of-range input and [`PasswordError::Hash`] when hashing fails.
    pub fn from_plaintext(plaintext: &str) -> Result<Self, PasswordError> {
        if plaintext.len() < MIN_PASSWORD_BYTES {
            return Err(PasswordError::TooShort);
        }
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return Err(PasswordError::TooLong);
        }
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)?
            .to_string();
        Ok(Self { hash })
    }

    /// Wrap a hash loaded from storage.
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }

    /// PHC-formatted hash.
    #[must_use]
    pub fn hash(&self) -> &str {
        self.hash.as_str()
    }

    /// `true` when `candidate` hashes to the stored value.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordError::Hash`] when the stored hash cannot be parsed.
    pub fn matches(&self, candidate: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(&self.hash)?;
        match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Password").field("hash", &"<redacted>").finish()
    }
}
