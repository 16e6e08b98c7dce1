//! Bullet Train settings - environment-driven configuration for the API
//!
//! Resolves process environment variables into one immutable
//! [`Settings`] value at startup. The value is then handed to every
//! component that needs it; nothing reads the environment afterwards.
//!
//! # Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Environment parsing, defaults and resolution
//! - **infra**: Instance metadata lookup
//! - **errors**: Centralized error handling
//!
//! # Usage
//!
//! ```no_run
//! use bullet_train_settings::{EnvVars, Resolver};
//!
//! let resolution = Resolver::new().resolve(&EnvVars::from_process())?;
//! for advisory in &resolution.advisories {
//!     eprintln!("{}: {}", advisory.setting, advisory.message);
//! }
//! let settings = resolution.settings;
//! # Ok::<(), bullet_train_settings::SettingsError>(())
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod infra;

// Re-export commonly used types at crate root
pub use config::{Advisory, EnvVars, Resolution, Resolver, Settings};
pub use errors::{SettingsError, SettingsResult};
pub use infra::{DisabledProbe, InstanceMetadataProbe, MetadataProbe};
