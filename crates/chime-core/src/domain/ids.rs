//! Domain identifiers (strongly-typed IDs).
//!
//! Goal and user ids are assigned outside the dispatcher (by the API layer or
//! the database), so they are carried as opaque strings. The phantom marker
//! keeps a `GoalId` from being passed where a `UserId` is expected.
//!
//! Users in the legacy database have integer keys, so deserialization accepts
//! either a JSON string or a JSON integer.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// IdMarker names the kind of entity an id refers to.
pub trait IdMarker: Send + Sync + 'static {
    /// Short entity name used in `Debug` output (e.g. "goal").
    fn kind() -> &'static str;
}

/// Generic opaque id.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T: IdMarker> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl<T: IdMarker> From<&str> for Id<T> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> From<String> for Id<T> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

impl<T: IdMarker> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", T::kind(), self.value)
    }
}

impl<T: IdMarker> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de, T: IdMarker> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
        }

        let value = match RawId::deserialize(deserializer)? {
            RawId::Text(text) => text,
            RawId::Number(n) => n.to_string(),
        };
        if value.trim().is_empty() {
            return Err(serde::de::Error::custom(format!(
                "{} id must not be empty",
                T::kind()
            )));
        }
        Ok(Self::new(value))
    }
}

// ========================================
// Markers
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Goal {}

impl IdMarker for Goal {
    fn kind() -> &'static str {
        "goal"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum User {}

impl IdMarker for User {
    fn kind() -> &'static str {
        "user"
    }
}

/// Identifier of a Goal (one scheduled reminder).
pub type GoalId = Id<Goal>;

/// Identifier of the User owning goals.
pub type UserId = Id<User>;
