// src/config/models.rs
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Upstream endpoint addresses, in priority order. The first address is
    /// the initial primary.
    pub endpoints: Vec<String>,

    #[serde(default = "default_dial_timeout_secs")]
    pub dial_timeout_secs: u64,

    /// Path GET-probed on every dial; no probe when unset.
    #[serde(default)]
    pub probe_path: Option<String>,

    #[serde(default)]
    pub revive: ReviveConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviveConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_revive_interval_secs")]
    pub interval_secs: u64,
}

fn default_dial_timeout_secs() -> u64 {
    5
}

fn default_revive_interval_secs() -> u64 {
    30
}

impl Default for ReviveConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: default_revive_interval_secs(),
        }
    }
}

impl PoolConfig {
    pub fn dial_timeout(&self) -> Duration {
        Duration::from_secs(self.dial_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.endpoints.iter().any(|e| !e.trim().is_empty()) {
            bail!("config must list at least one endpoint address");
        }
        if self.dial_timeout_secs == 0 {
            bail!("dial_timeout_secs must be greater than zero");
        }
        if self.revive.enabled && self.revive.interval_secs == 0 {
            bail!("revive.interval_secs must be greater than zero");
        }
        Ok(())
    }
}

impl ReviveConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}
