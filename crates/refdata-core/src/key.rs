//! Typed primary keys.

use std::fmt;

use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::schema::KeyKind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid {kind:?} key: {value}")]
    Invalid { kind: KeyKind, value: String },
}

/// Primary key value of a single row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKey {
    Text(String),
    Int(i64),
    Uuid(Uuid),
}

impl RecordKey {
    /// Parses a key taken from a URL path segment.
    pub fn parse(kind: KeyKind, raw: &str) -> Result<Self, KeyError> {
        let invalid = || KeyError::Invalid {
            kind,
            value: raw.to_string(),
        };
        match kind {
            KeyKind::Text | KeyKind::Code2 => Ok(Self::Text(raw.to_string())),
            KeyKind::Serial => raw.parse::<i64>().map(Self::Int).map_err(|_| invalid()),
            KeyKind::Uuid => Uuid::parse_str(raw).map(Self::Uuid).map_err(|_| invalid()),
        }
    }

    /// Reads a key out of a JSON value. `null` and mistyped values yield `None`.
    pub fn from_value(kind: KeyKind, value: &Value) -> Option<Self> {
        match kind {
            KeyKind::Text | KeyKind::Code2 => value.as_str().map(|s| Self::Text(s.to_string())),
            KeyKind::Serial => value.as_i64().map(Self::Int),
            KeyKind::Uuid => value
                .as_str()
                .and_then(|s| Uuid::parse_str(s).ok())
                .map(Self::Uuid),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Int(i) => Value::from(*i),
            Self::Uuid(u) => Value::String(u.to_string()),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Uuid(u) => write!(f, "{u}"),
        }
    }
}

impl From<&str> for RecordKey {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for RecordKey {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<Uuid> for RecordKey {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}
