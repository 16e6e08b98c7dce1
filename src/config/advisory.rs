//! Non-fatal warnings raised while resolving settings.

use serde::Serialize;

/// A warning about a setting that did not stop resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advisory {
    /// Environment variable the warning is about
    pub setting: &'static str,
    pub message: String,
}

/// Collects advisories in the order they are raised.
#[derive(Debug, Default)]
pub(crate) struct Advisories {
    items: Vec<Advisory>,
}

impl Advisories {
    /// Record an advisory and log it as a warning.
    pub fn warn(&mut self, setting: &'static str, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(setting, "{}", message);
        self.items.push(Advisory { setting, message });
    }

    pub fn into_vec(self) -> Vec<Advisory> {
        self.items
    }
}
