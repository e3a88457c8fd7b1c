//! Movie running time with its `"<N> mins"` wire form.
//!
//! Encoding always renders `"<N> mins"`, whatever the sign of `N`. Decoding
//! accepts only a JSON string of exactly that shape: one space, the literal
//! `mins` suffix and an `i32` prefix. Every other input, including bare JSON
//! numbers, fails with [`InvalidRuntimeFormat`]. Positivity is a validation
//! rule, not a codec rule, so `"0 mins"` and `"-5 mins"` decode.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Raised for any runtime value not shaped like `"<N> mins"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid runtime format")]
pub struct InvalidRuntimeFormat;

/// Running time in whole minutes.
///
/// # Examples
/// ```
/// use yamda::domain::Runtime;
///
/// let runtime: Runtime = "102 mins".parse().expect("valid runtime");
/// assert_eq!(runtime.minutes(), 102);
/// assert_eq!(runtime.to_string(), "102 mins");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Runtime(i32);

impl Runtime {
    /// Wrap a minute count.
    #[must_use]
    pub const fn new(minutes: i32) -> Self {
        Self(minutes)
    }

    /// Minute count.
    #[must_use]
    pub const fn minutes(self) -> i32 {
        self.0
    }
}

impl From<i32> for Runtime {
    fn from(minutes: i32) -> Self {
        Self(minutes)
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} mins", self.0)
    }
}

impl FromStr for Runtime {
    type Err = InvalidRuntimeFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(' ') {
            Some((number, "mins")) => number
                .parse::<i32>()
                .map(Self)
                .map_err(|_| InvalidRuntimeFormat),
            _ => Err(InvalidRuntimeFormat),
        }
    }
}

impl Serialize for Runtime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Runtime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RuntimeVisitor)
    }
}

struct RuntimeVisitor;

impl RuntimeVisitor {
    fn reject<T, E: de::Error>() -> Result<T, E> {
        Err(E::custom(InvalidRuntimeFormat))
    }
}

impl<'de> Visitor<'de> for RuntimeVisitor {
    type Value = Runtime;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string of the form \"<N> mins\"")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Runtime, E> {
        value.parse().map_err(E::custom)
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Runtime, E> {
        Self::reject()
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<Runtime, E> {
        Self::reject()
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<Runtime, E> {
        Self::reject()
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<Runtime, E> {
        Self::reject()
    }

    fn visit_unit<E: de::Error>(self) -> Result<Runtime, E> {
        Self::reject()
    }

    fn visit_none<E: de::Error>(self) -> Result<Runtime, E> {
        Self::reject()
    }

    fn visit_seq<A: SeqAccess<'de>>(self, _: A) -> Result<Runtime, A::Error> {
        Self::reject()
    }

    fn visit_map<A: MapAccess<'de>>(self, _: A) -> Result<Runtime, A::Error> {
        Self::reject()
    }
}
