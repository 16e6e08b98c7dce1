//! Infrastructure layer - External systems integration
//!
//! The only outside system resolution talks to is the cloud instance
//! metadata endpoint.

pub mod metadata;

pub use metadata::{DisabledProbe, InstanceMetadataProbe, MetadataProbe};

#[cfg(any(test, feature = "test-utils"))]
pub use metadata::MockMetadataProbe;
