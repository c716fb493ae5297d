//! RBAC core configuration.
//!
//! Loaded from environment variables with defaults matching the role table
//! schema (50-character name and remark columns, 20 rows per page).

use rbac_model::FieldLimits;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Settings shared by the role service and listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RbacConfig {
    /// Page size used when a caller supplies a negative limit.
    pub default_page_limit: u64,

    /// Maximum role name length in characters.
    pub name_max_len: usize,

    /// Maximum role remark length in characters.
    pub remark_max_len: usize,
}

impl Default for RbacConfig {
    fn default() -> Self {
        let limits = FieldLimits::default();
        Self {
            default_page_limit: 20,
            name_max_len: limits.name_max_len,
            remark_max_len: limits.remark_max_len,
        }
    }
}

impl RbacConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RBAC_DEFAULT_PAGE_LIMIT`: Fallback page size (default: 20)
    /// - `RBAC_NAME_MAX_LEN`: Maximum role name length (default: 50)
    /// - `RBAC_REMARK_MAX_LEN`: Maximum remark length (default: 50)
    ///
    /// Unparseable values fall back to the default. The loaded values are
    /// validated, so a zero limit is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its
    /// value. Same parsing and validation as [`RbacConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();

        let config = Self {
            default_page_limit: lookup("RBAC_DEFAULT_PAGE_LIMIT")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default.default_page_limit),
            name_max_len: lookup("RBAC_NAME_MAX_LEN")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default.name_max_len),
            remark_max_len: lookup("RBAC_REMARK_MAX_LEN")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default.remark_max_len),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject zero limits, which would make every page or name invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let zero = [
            ("default_page_limit", self.default_page_limit == 0),
            ("name_max_len", self.name_max_len == 0),
            ("remark_max_len", self.remark_max_len == 0),
        ];
        for (key, is_zero) in zero {
            if is_zero {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Length bounds for role validation.
    pub fn field_limits(&self) -> FieldLimits {
        FieldLimits {
            name_max_len: self.name_max_len,
            remark_max_len: self.remark_max_len,
        }
    }
}
