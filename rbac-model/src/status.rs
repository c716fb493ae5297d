//! Enabled/disabled status shared by roles and rules.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a role or rule.
///
/// Persisted as a small integer: `0` means enabled, `1` means disabled.
/// Serialization keeps the numeric form so stored rows and filters agree.
///
/// # Examples
///
/// ```
/// use rbac_model::Status;
///
/// assert_eq!(Status::default(), Status::Enabled);
/// assert_eq!(Status::Disabled.code(), 1);
/// assert_eq!(Status::from_code(0), Some(Status::Enabled));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(into = "u8", try_from = "u8")]
pub enum Status {
    /// Active and taken into account by access resolution
    Enabled = 0,

    /// Present but ignored by access resolution
    Disabled = 1,
}

impl Status {
    /// Numeric code as stored.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Parse a stored numeric code.
    ///
    /// # Returns
    ///
    /// `Some(Status)` for `0` or `1`, `None` otherwise
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Enabled),
            1 => Some(Self::Disabled),
            _ => None,
        }
    }

    /// Check if this status is enabled.
    pub fn is_enabled(self) -> bool {
        self == Self::Enabled
    }

    /// Get string representation of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::Enabled
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Status> for u8 {
    fn from(status: Status) -> Self {
        status.code()
    }
}

impl TryFrom<u8> for Status {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("invalid status code: {}", code))
    }
}
