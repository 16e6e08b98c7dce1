//! Environment snapshot and typed readers.
//!
//! Every reader follows the same rule: an absent variable yields the
//! default, a present one must parse into the declared type.

use std::collections::HashMap;
use std::ffi::OsString;

use crate::errors::{SettingsError, SettingsResult};

const TRUTHY: &[&str] = &["1", "true", "t", "yes", "y", "on"];
const FALSY: &[&str] = &["0", "false", "f", "no", "n", "off"];

/// Immutable snapshot of string environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvVars {
    vars: HashMap<String, String>,
}

impl EnvVars {
    /// Snapshot the process environment, loading `.env` first if present.
    pub fn from_process() -> Self {
        dotenvy::dotenv().ok();
        Self::from_os_vars(std::env::vars_os())
    }

    /// Keep only entries whose name and value are valid UTF-8; none of the
    /// recognised variables can hold anything else.
    fn from_os_vars(vars: impl IntoIterator<Item = (OsString, OsString)>) -> Self {
        vars.into_iter()
            .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => Some((key, value)),
                (key, _) => {
                    tracing::debug!(
                        name = %key.unwrap_or_else(|raw| raw.to_string_lossy().into_owned()),
                        "Skipping environment variable that is not valid UTF-8"
                    );
                    None
                }
            })
            .collect()
    }

    /// Raw value of a variable, if set.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// String value, or `default` when unset.
    pub fn string(&self, name: &'static str, default: &str) -> String {
        self.get(name).unwrap_or(default).to_string()
    }

    /// String value where unset and empty both mean "not configured".
    pub fn optional(&self, name: &'static str) -> Option<String> {
        self.get(name)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    pub fn int(&self, name: &'static str, default: i64) -> SettingsResult<i64> {
        match self.get(name) {
            None => Ok(default),
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| SettingsError::parse(name, raw, "integer")),
        }
    }

    pub fn float(&self, name: &'static str, default: f64) -> SettingsResult<f64> {
        match self.get(name) {
            None => Ok(default),
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| SettingsError::parse(name, raw, "float")),
        }
    }

    pub fn bool(&self, name: &'static str, default: bool) -> SettingsResult<bool> {
        let Some(raw) = self.get(name) else {
            return Ok(default);
        };

        let value = raw.trim().to_ascii_lowercase();
        if TRUTHY.contains(&value.as_str()) {
            Ok(true)
        } else if FALSY.contains(&value.as_str()) {
            Ok(false)
        } else {
            Err(SettingsError::parse(name, raw, "boolean"))
        }
    }

    /// Comma separated list. Items are trimmed and empty items dropped.
    pub fn list(&self, name: &'static str, default: &[&str]) -> Vec<String> {
        match self.get(name) {
            None => default.iter().map(|item| item.to_string()).collect(),
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for EnvVars
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}
