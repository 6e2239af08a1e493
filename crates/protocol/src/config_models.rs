//! Runtime configuration models for `.agent-kit/config.toml`.
//!
//! This module defines the structure of the configuration file that
//! controls process-wide settings for agent-kit.

use serde::Deserialize;
use serde::Serialize;
use ts_rs::TS;

/// What the agent manager does when an agent is registered under a name
/// that is already taken.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Overwrite the existing entry (last write wins) and log a warning.
    ///
    /// The replaced agent is NOT stopped.
    #[default]
    Replace,

    /// Refuse the registration and leave the existing entry in place.
    Reject,
}

/// Represents runtime settings from `.agent-kit/config.toml`.
///
/// # Example
///
/// ```toml
/// # .agent-kit/config.toml
/// duplicate_registration = "reject"
/// log_level = "debug"
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct RuntimeConfig {
    /// Policy applied when registering a second agent under an existing name.
    #[serde(default)]
    pub duplicate_registration: DuplicatePolicy,

    /// Default tracing filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            duplicate_registration: DuplicatePolicy::default(),
            log_level: default_log_level(),
        }
    }
}
