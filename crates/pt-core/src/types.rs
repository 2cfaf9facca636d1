//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
}

/// A validated user identifier.
///
/// User IDs are opaque, platform-assigned strings and must be non-empty.
/// They are the primary key for playtime records; display names are never
/// used as keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Creates a new ID after validation.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::Empty { field: "user ID" });
        }
        Ok(Self(id))
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_rejects_empty() {
        assert!(UserId::new("").is_err());
        assert!(UserId::new("123456789").is_ok());
    }

    #[test]
    fn user_id_serde_roundtrip() {
        let id = UserId::new("329871").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"329871\"");
        let parsed: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn user_id_serde_rejects_empty() {
        let result: Result<UserId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn user_id_as_ref() {
        let id = UserId::new("u-42").unwrap();
        let s: &str = id.as_ref();
        assert_eq!(s, "u-42");
    }

    #[test]
    fn user_id_usable_as_map_key() {
        use std::collections::BTreeMap;

        let mut map = BTreeMap::new();
        map.insert(UserId::new("1").unwrap(), 10);
        map.insert(UserId::new("2").unwrap(), 20);

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"1":10,"2":20}"#);

        let parsed: BTreeMap<UserId, i64> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, map);
    }
}
