//! Application configuration module
//!
//! Resolves environment variables into typed, immutable [`Settings`].

mod advisory;
mod constants;
mod database;
mod env;
pub mod pipeline;
mod resolver;
mod secret;
mod settings;

pub use advisory::Advisory;
pub use constants::*;
pub use database::{DatabaseConfig, DatabaseEngine};
pub use env::EnvVars;
pub use resolver::{Resolution, Resolver};
pub use secret::Secret;
pub use settings::*;
