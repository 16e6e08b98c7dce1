//! Commands module - CLI command implementations.
//!
//! Each command is implemented in its own module for separation of concerns.

pub mod check;
pub mod show;

use crate::config::{EnvVars, Resolution, Resolver};
use crate::errors::SettingsResult;
use crate::infra::DisabledProbe;

/// Resolve with or without the instance metadata lookup.
fn resolve(env: &EnvVars, no_probe: bool) -> SettingsResult<Resolution> {
    if no_probe {
        Resolver::with_probe(DisabledProbe).resolve(env)
    } else {
        Resolver::new().resolve(env)
    }
}
