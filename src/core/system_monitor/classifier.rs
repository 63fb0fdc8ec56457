//! Severity classification for percentage metrics.
//!
//! Maps a usage percentage onto a severity tier using per-metric thresholds.
//! Boundary values belong to the higher tier: a reading exactly at the
//! warning threshold is a warning, exactly at the critical threshold is critical.

use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, Result};

/// Default warning threshold (%) for CPU and memory
pub const DEFAULT_WARNING_PERCENT: f32 = 60.0;
/// Default critical threshold (%) for CPU and memory
pub const DEFAULT_CRITICAL_PERCENT: f32 = 85.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Normal,
    Warning,
    Critical,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Normal => "normal",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

/// Warning/critical pair for a single metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub warning: f32,  // Warning threshold (%)
    pub critical: f32, // Critical threshold (%)
}

impl Thresholds {
    /// Build a validated threshold pair.
    pub fn new(warning: f32, critical: f32) -> Result<Self> {
        let thresholds = Self { warning, critical };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<()> {
        let in_range = |v: f32| v.is_finite() && (0.0..=100.0).contains(&v);
        if !in_range(self.warning) || !in_range(self.critical) {
            return Err(MonitorError::config(format!(
                "thresholds must lie within 0-100% (warning {}, critical {})",
                self.warning, self.critical
            )));
        }
        if self.warning > self.critical {
            return Err(MonitorError::config(format!(
                "warning threshold {} exceeds critical threshold {}",
                self.warning, self.critical
            )));
        }
        Ok(())
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warning: DEFAULT_WARNING_PERCENT,
            critical: DEFAULT_CRITICAL_PERCENT,
        }
    }
}

/// Thresholds for every classified metric
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default)]
    pub cpu: Thresholds,
    #[serde(default)]
    pub memory: Thresholds,
}

impl ThresholdConfig {
    pub fn validate(&self) -> Result<()> {
        self.cpu.validate()?;
        self.memory.validate()
    }
}

/// Classify a percentage against a threshold pair
pub fn classify(percent: f32, thresholds: Thresholds) -> Severity {
    if percent < thresholds.warning {
        Severity::Normal
    } else if percent < thresholds.critical {
        Severity::Warning
    } else {
        Severity::Critical
    }
}
