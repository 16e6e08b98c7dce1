//! Centralized error handling.
//!
//! Resolution either completes (possibly with advisories) or fails with
//! one of these errors, which halts process startup.

use thiserror::Error;

/// Fatal settings errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// A required variable has no value and no default.
    #[error("{name} environment variable must be set")]
    Missing { name: &'static str },

    /// A present value could not be parsed into its declared type.
    #[error("{name}={value:?} is not a valid {expected}")]
    Parse {
        name: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Invalid DATABASE_URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("Failed to render output: {0}")]
    Output(String),
}

/// Result type alias
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Convenience constructors
impl SettingsError {
    pub fn parse(name: &'static str, value: impl Into<String>, expected: &'static str) -> Self {
        SettingsError::Parse {
            name,
            value: value.into(),
            expected,
        }
    }

    pub fn invalid_database_url(reason: impl Into<String>) -> Self {
        SettingsError::InvalidDatabaseUrl(reason.into())
    }

    pub fn output(msg: impl Into<String>) -> Self {
        SettingsError::Output(msg.into())
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        SettingsError::Output(err.to_string())
    }
}
