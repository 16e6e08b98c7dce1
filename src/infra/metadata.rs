//! Instance metadata lookup.
//!
//! Load-balanced deployments need the host's private address in the
//! allowed hosts list. The lookup is best effort: any failure means
//! "no address" and resolution carries on.

use std::time::Duration;

use crate::config::{INSTANCE_METADATA_LOCAL_IPV4_URL, INSTANCE_METADATA_TIMEOUT_MS};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Source of the host's private IPv4 address.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait MetadataProbe {
    /// Private address of this host, or `None` if it cannot be determined.
    fn local_ipv4(&self) -> Option<String>;
}

impl<P: MetadataProbe + ?Sized> MetadataProbe for &P {
    fn local_ipv4(&self) -> Option<String> {
        (**self).local_ipv4()
    }
}

/// Queries the cloud instance metadata endpoint over HTTP.
#[derive(Debug, Clone)]
pub struct InstanceMetadataProbe {
    url: String,
    timeout: Duration,
}

impl InstanceMetadataProbe {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }

    fn fetch(url: &str, timeout: Duration) -> reqwest::Result<String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;

        client.get(url).send()?.error_for_status()?.text()
    }

    /// Run the blocking request on its own thread. The blocking client owns
    /// a runtime and panics when created or dropped inside an async context.
    fn fetch_detached(&self) -> Result<String, String> {
        let url = self.url.clone();
        let timeout = self.timeout;
        let handle = std::thread::Builder::new()
            .name("instance-metadata".to_string())
            .spawn(move || Self::fetch(&url, timeout).map_err(|e| e.to_string()))
            .map_err(|e| format!("could not start lookup thread: {}", e))?;

        handle
            .join()
            .map_err(|_| "lookup thread panicked".to_string())?
    }
}

impl Default for InstanceMetadataProbe {
    fn default() -> Self {
        Self::new(
            INSTANCE_METADATA_LOCAL_IPV4_URL,
            Duration::from_millis(INSTANCE_METADATA_TIMEOUT_MS),
        )
    }
}

impl MetadataProbe for InstanceMetadataProbe {
    fn local_ipv4(&self) -> Option<String> {
        match self.fetch_detached() {
            Ok(body) => {
                let address = body.trim();
                if address.is_empty() {
                    tracing::debug!(url = %self.url, "Instance metadata returned an empty address");
                    None
                } else {
                    tracing::debug!(address, "Discovered private address from instance metadata");
                    Some(address.to_string())
                }
            }
            Err(e) => {
                tracing::debug!(url = %self.url, "Instance metadata unavailable: {}", e);
                None
            }
        }
    }
}

/// Probe that never looks anything up.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledProbe;

impl MetadataProbe for DisabledProbe {
    fn local_ipv4(&self) -> Option<String> {
        None
    }
}
