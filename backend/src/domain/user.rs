//! User accounts.
//!
//! Registration input arrives as a [`UserRegistration`], is checked with
//! [`UserRegistration::check`] and only then hashed into a [`Password`].
//! Stored accounts are represented by [`User`].

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::password::{Password, check_plaintext};
use crate::domain::validator::{Validator, matches};

/// Longest accepted name, in bytes.
pub const MAX_NAME_BYTES: usize = 500;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

/// Pattern an email address must match.
pub fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Record `email` failures.
pub fn check_email(v: &mut Validator, email: Option<&str>) {
    match email {
        None | Some("") => v.add_error("email", "must be provided"),
        Some(email) => v.check(
            matches(email, email_regex()),
            "email",
            "must be a valid email address",
        ),
    }
}

/// Record `name` failures.
pub fn check_name(v: &mut Validator, name: Option<&str>) {
    match name {
        None | Some("") => v.add_error("name", "must be provided"),
        Some(name) => v.check(
            name.len() <= MAX_NAME_BYTES,
            "name",
            "must not be more than 500 bytes long",
        ),
    }
}

/// A stored account.
///
/// The password and version are never serialised. `created_at` is `None`
/// until the row has been written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct User {
    /// Server-assigned identifier.
    #[schema(example = 1)]
    pub id: i64,
    /// Insertion timestamp.
    #[schema(value_type = Option<String>, format = DateTime)]
    pub created_at: Option<DateTime<Utc>>,
    /// Display name.
    #[schema(example = "Alice Smith")]
    pub name: String,
    /// Unique contact address.
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// Hashed credential.
    #[serde(skip)]
    #[schema(ignore)]
    pub password: Password,
    /// Whether the account has been activated.
    pub activated: bool,
    /// Optimistic concurrency token.
    #[serde(skip)]
    #[schema(ignore)]
    pub version: i32,
}

/// Account fields ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Unique contact address.
    pub email: String,
    /// Hashed credential.
    pub password: Password,
    /// Initial activation state.
    pub activated: bool,
}

/// Unvalidated registration input.
#[derive(Debug, Clone, Default)]
pub struct UserRegistration {
    /// Requested display name.
    pub name: Option<String>,
    /// Requested email address.
    pub email: Option<String>,
    /// Plaintext password, wiped from memory on drop.
    pub password: Option<Zeroizing<String>>,
}

impl UserRegistration {
    /// Run every registration rule, recording failures in `v`.
    pub fn check(&self, v: &mut Validator) {
        check_name(v, self.name.as_deref());
        check_email(v, self.email.as_deref());
        check_plaintext(v, self.password.as_deref().map(String::as_str));
    }
}

#[cfg(test)]
mod tests {
    //! Registration rules and account serialisation.

    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn registration() -> UserRegistration {
        UserRegistration {
            name: Some("Alice Smith".to_owned()),
            email: Some("alice@example.com".to_owned()),
            password: Some(Zeroizing::new("pa55word".to_owned())),
        }
    }

    fn errors(registration: &UserRegistration) -> crate::domain::ValidationErrors {
        let mut v = Validator::new();
        registration.check(&mut v);
        v.into_errors()
    }

    #[rstest]
    fn valid_registration_passes(registration: UserRegistration) {
        assert!(errors(&registration).is_empty());
    }

    #[rstest]
    fn missing_fields_are_reported() {
        let errors = errors(&UserRegistration::default());
        for field in ["name", "email", "password"] {
            assert_eq!(errors.get(field), Some("must be provided"), "{field}");
        }
    }

    #[rstest]
    fn long_name_is_rejected(mut registration: UserRegistration) {
        registration.name = Some("n".repeat(501));
        assert_eq!(
            errors(&registration).get("name"),
            Some("must not be more than 500 bytes long")
        );
    }

    #[rstest]
    #[case("alice@example.com", true)]
    #[case("a.b+tag@sub.example.co.uk", true)]
    #[case("alice", false)]
    #[case("alice@", false)]
    #[case("@example.com", false)]
    #[case("alice@-example.com", false)]
    #[case("alice smith@example.com", false)]
    fn email_pattern(#[case] email: &str, #[case] valid: bool) {
        let mut v = Validator::new();
        check_email(&mut v, Some(email));
        assert_eq!(v.is_valid(), valid, "{email}");
    }

    #[rstest]
    fn user_serialises_without_secrets() {
        let user = User {
            id: 1234,
            created_at: None,
            name: "Alice Smith".to_owned(),
            email: "alice@example.com".to_owned(),
            password: Password::from_hash("$argon2id$hash"),
            activated: false,
            version: 1,
        };
        let json = serde_json::to_string(&user).expect("serialise user");
        assert_eq!(
            json,
            r#"{"id":1234,"created_at":null,"name":"Alice Smith","email":"alice@example.com","activated":false}"#
        );
    }
}
