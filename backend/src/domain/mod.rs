//! Domain types, validation rules and services.
//!
//! Nothing in here knows about HTTP or SQL. Inbound adapters decode requests
//! into domain inputs; outbound adapters implement the traits in [`ports`].

pub mod error;
pub mod filters;
pub mod movie;
pub mod movie_service;
pub mod password;
pub mod ports;
pub mod runtime;
pub mod trace_id;
pub mod user;
pub mod user_service;
pub mod validator;

pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::filters::{Filters, MovieListQuery, MovieSearch, MovieSort, MovieSortColumn};
pub use self::movie::{Movie, MovieDraft, MovieFields, MoviePatch};
pub use self::movie_service::MovieService;
pub use self::password::{Password, PasswordError};
pub use self::runtime::{InvalidRuntimeFormat, Runtime};
pub use self::trace_id::TraceId;
pub use self::user::{NewUser, User, UserRegistration};
pub use self::user_service::UserService;
pub use self::validator::{ValidationErrors, Validator};

