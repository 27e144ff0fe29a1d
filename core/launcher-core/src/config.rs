//! Launcher configuration loading.
//!
//! Configuration lives in `~/.linphone/launcher.toml`. A missing file means
//! defaults; a malformed file is an error the host decides how to surface.
//!
//! ```toml
//! [display]
//! orientation_portrait_only = true
//!
//! [provisioning]
//! display_remote_provisioning = true
//!
//! [startup]
//! show_tutorials_instead_of_app = false
//! readiness_poll_interval_ms = 30
//! settle_delay_ms = 1000
//! ```
//!
//! The "first remote provisioning" flag is a persisted user preference, not
//! configuration; it is read through
//! [`ProvisioningPreferences`](crate::collaborators::ProvisioningPreferences).

use crate::error::{LauncherError, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_CONFIG_RELATIVE_PATH: &str = ".linphone/launcher.toml";
const DEFAULT_POLL_INTERVAL_MS: u64 = 30;
const DEFAULT_SETTLE_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct LauncherConfig {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub provisioning: ProvisioningConfig,
    #[serde(default)]
    pub startup: StartupConfig,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Pins the launcher to portrait. Whether that matches the tablet layout
    /// is not checked here.
    #[serde(default)]
    pub orientation_portrait_only: bool,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ProvisioningConfig {
    /// Deployment offers the remote provisioning screen on first run.
    #[serde(default)]
    pub display_remote_provisioning: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct StartupConfig {
    #[serde(default)]
    pub show_tutorials_instead_of_app: bool,
    #[serde(default = "default_poll_interval_ms")]
    pub readiness_poll_interval_ms: u64,
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            show_tutorials_instead_of_app: false,
            readiness_poll_interval_ms: default_poll_interval_ms(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_settle_delay_ms() -> u64 {
    DEFAULT_SETTLE_DELAY_MS
}

impl LauncherConfig {
    pub fn poll_interval(&self) -> Duration {
        // A zero interval would turn the poller into a spin loop.
        Duration::from_millis(self.startup.readiness_poll_interval_ms.max(1))
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.startup.settle_delay_ms)
    }
}

/// Returns the default configuration path (`~/.linphone/launcher.toml`).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DEFAULT_CONFIG_RELATIVE_PATH))
}

/// Loads the launcher configuration from `path`, or from the default location.
pub fn load_launcher_config(path: Option<PathBuf>) -> Result<LauncherConfig> {
    let config_path = match path.or_else(default_config_path) {
        Some(path) => path,
        None => return Ok(LauncherConfig::default()),
    };

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No launcher config; using defaults");
        return Ok(LauncherConfig::default());
    }

    let content = fs_err::read_to_string(&config_path).map_err(|source| LauncherError::Io {
        context: format!("reading launcher config {}", config_path.display()),
        source,
    })?;
    toml::from_str::<LauncherConfig>(&content).map_err(|err| LauncherError::ConfigMalformed {
        path: config_path,
        details: err.to_string(),
    })
}
