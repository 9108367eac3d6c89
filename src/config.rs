//! Configuration module
//!
//! Reads the engine configuration from a TOML file
//! (`~/.config/texnouz-consumption/config.toml` by default). Every key is
//! optional; missing sections fall back to their defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::shared::errors::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub logging: LoggingConfig,
    pub roaming: RoamingConfig,
    pub vendor: VendorConfig,
    pub inactivity: InactivityConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoamingConfig {
    /// Deadline for every OCPI/OICP CPO call
    pub timeout_secs: u64,
    /// How far before the transaction start an authorization may be matched
    pub authorization_lookback_mins: i64,
}

impl Default for RoamingConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            authorization_lookback_mins: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorConfig {
    /// Deadline for the vendor connector-limit query
    pub timeout_secs: u64,
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InactivityConfig {
    pub ac_notification_interval_mins: i64,
    pub dc_notification_interval_mins: i64,
}

impl Default for InactivityConfig {
    fn default() -> Self {
        Self {
            ac_notification_interval_mins: 60,
            dc_notification_interval_mins: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Smallest current a charging profile may set per connected phase
    pub min_amps_per_phase: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            min_amps_per_phase: 13,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("texnouz-consumption")
        .join("config.toml")
}

// ── Tests ──────────────────────────────────────────────────────
