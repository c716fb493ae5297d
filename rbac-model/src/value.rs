//! Column values used by conditions and access projections.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::status::Status;

/// A single column value.
///
/// Values are what conditions compare against and what the access resolver
/// projects out of rule rows. Serialized untagged, so `Int(3)` is `3` and
/// `Text("x")` is `"x"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(untagged)]
pub enum Value {
    /// Integer column (ids, status codes)
    Int(i64),

    /// Text column (names, remarks)
    Text(String),
}

impl Value {
    /// Get the integer payload, if any.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    /// Get the text payload, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Int(_) => None,
            Self::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Self::Text(s.clone())
    }
}

impl From<Status> for Value {
    fn from(status: Status) -> Self {
        Self::Int(i64::from(status.code()))
    }
}
