//! Configuration loaded from `fixsweep.toml`.
//!
//! [`SweepConfig`] holds every tunable: connection settings, paging,
//! transport retry policy, and the transition-matching tables used by
//! the explorer and the status restorer. Values absent from the file
//! fall back to defaults. The `JIRA_TOKEN` environment variable takes
//! precedence over the file for the access token.

use std::path::Path;

use serde::Deserialize;

use crate::engine::{ExplorerConfig, RestorerConfig};
use crate::error::SweepError;

/// Top-level configuration loaded from `fixsweep.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct SweepConfig {
    /// Base URL of the JIRA server, e.g. `https://jira.example.com`.
    #[serde(default)]
    pub base_url: String,

    /// Personal access token. Overridden by `JIRA_TOKEN` when set.
    #[serde(default)]
    pub token: String,

    /// Page size for the JQL listing loop.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Bounded retry count for transport-level failures. Workflow
    /// fallbacks are a separate mechanism and not affected.
    #[serde(default = "default_transport_retries")]
    pub transport_retries: u32,

    /// Delay between transport retries, in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Transition-name tiers for the explorer.
    #[serde(default)]
    pub explorer: ExplorerConfig,

    /// Status-synonym table for the restorer.
    #[serde(default)]
    pub restorer: RestorerConfig,
}

// JIRA's recommended search batch size.
fn default_page_size() -> u32 {
    100
}

fn default_transport_retries() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    500
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: String::new(),
            page_size: default_page_size(),
            transport_retries: default_transport_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            explorer: ExplorerConfig::default(),
            restorer: RestorerConfig::default(),
        }
    }
}

impl SweepConfig {
    /// Load configuration from `fixsweep.toml` in the current
    /// directory, falling back to defaults if the file is absent.
    pub fn load() -> Result<Self, SweepError> {
        Self::load_from(Path::new("fixsweep.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self, SweepError> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<SweepConfig>(&contents)?
        } else {
            Self::default()
        };

        // Environment token wins over the file.
        if let Ok(token) = std::env::var("JIRA_TOKEN")
            && !token.is_empty()
        {
            config.token = token;
        }

        Ok(config)
    }
}
