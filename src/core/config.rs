use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::system_monitor::{IntervalSetting, ThresholdConfig, DEFAULT_STOP_TIMEOUT};

const DEFAULT_UI_REFRESH_MS: u64 = 250;

fn default_stop_timeout_ms() -> u64 {
    DEFAULT_STOP_TIMEOUT.as_millis() as u64
}

fn default_ui_refresh_ms() -> u64 {
    DEFAULT_UI_REFRESH_MS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Sampling interval in seconds (clamped to 0.1-5.0)
    #[serde(default)]
    pub interval_secs: IntervalSetting,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    /// How long shutdown waits for the sampler before giving up
    #[serde(default = "default_stop_timeout_ms")]
    pub stop_timeout_ms: u64,
    /// Redraw cadence of the dashboard, independent of the sampling interval
    #[serde(default = "default_ui_refresh_ms")]
    pub ui_refresh_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_secs: IntervalSetting::default(),
            thresholds: ThresholdConfig::default(),
            stop_timeout_ms: default_stop_timeout_ms(),
            ui_refresh_ms: default_ui_refresh_ms(),
        }
    }
}

impl Config {
    /// Load from the user config directory, falling back to defaults when absent.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let data = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        if data.trim().is_empty() {
            return Ok(Config::default());
        }

        let config: Config = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;
        config.validate()?;

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data = serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        fs::write(config_path, data)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("mtech-monitor").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        self.thresholds
            .validate()
            .with_context(|| "Invalid severity thresholds")?;
        Ok(())
    }

    pub fn set_interval(&mut self, seconds: f64) -> IntervalSetting {
        self.interval_secs = IntervalSetting::new(seconds);
        self.interval_secs
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }

    pub fn ui_refresh(&self) -> Duration {
        Duration::from_millis(self.ui_refresh_ms.max(1))
    }
}
