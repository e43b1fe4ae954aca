//! Configuration for the pairing engine.
//!
//! Everything has a working default so the engine can run with no
//! config file at all; a TOML file fills in invite codes, the owner
//! id, and pacing overrides.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::id::UserId;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PalaverConfig {
    /// Access gating configuration
    #[serde(default)]
    pub access: AccessConfig,

    /// Message pacing configuration
    #[serde(default)]
    pub pacer: PacerConfig,
}

/// Access gating configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Invite codes accepted by `/join`
    #[serde(default)]
    pub invite_codes: Vec<String>,

    /// User allowed to run `/revoke` and `/allow`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserId>,
}

/// Message pacing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacerConfig {
    /// Minimum interval between relayed messages per sender, in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Maximum pending messages per sender before drops start
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_queue_capacity() -> usize {
    10
}

impl Default for PacerConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl PacerConfig {
    /// The inter-message delay as a [`Duration`].
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Load configuration from a TOML file.
pub async fn load_config(path: impl AsRef<Path>) -> Result<PalaverConfig> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|cause| CoreError::ConfigReadFailed {
            path: path.display().to_string(),
            cause,
        })?;
    toml::from_str(&raw).map_err(|cause| CoreError::ConfigParseFailed {
        path: path.display().to_string(),
        cause,
    })
}
