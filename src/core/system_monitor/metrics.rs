use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::classifier::{classify, Severity, ThresholdConfig};

/// Memory accounting for one sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemoryUsage {
    pub used_bytes: u64,
    pub total_bytes: u64,
    pub percent: f32,
}

impl MemoryUsage {
    /// Build from raw byte counts. `None` when the OS reports no memory.
    pub fn from_bytes(used_bytes: u64, total_bytes: u64) -> Option<Self> {
        if total_bytes == 0 {
            return None;
        }
        let used_bytes = used_bytes.min(total_bytes);
        Some(Self {
            used_bytes,
            total_bytes,
            percent: clamp_percent(used_bytes as f64 / total_bytes as f64 * 100.0)?,
        })
    }

    pub fn used_mb(&self) -> u64 {
        self.used_bytes / 1024 / 1024
    }

    pub fn total_mb(&self) -> u64 {
        self.total_bytes / 1024 / 1024
    }
}

/// Raw readings produced by a metric source. Absent fields are degraded metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawReading {
    pub cpu_percent: Option<f32>,
    pub cpu_temperature_c: Option<f32>,
    pub memory: Option<MemoryUsage>,
}

impl RawReading {
    pub fn is_empty(&self) -> bool {
        self.cpu_percent.is_none() && self.cpu_temperature_c.is_none() && self.memory.is_none()
    }
}

/// Immutable result of one sampling cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub cpu_percent: Option<f32>,
    pub cpu_temperature_c: Option<f32>,
    pub memory: Option<MemoryUsage>,
    pub cpu_severity: Option<Severity>,
    pub memory_severity: Option<Severity>,
}

impl Snapshot {
    /// Classify a raw reading and stamp it with the current time.
    pub fn from_reading(reading: RawReading, thresholds: &ThresholdConfig, sequence: u64) -> Self {
        let cpu_percent = reading.cpu_percent.and_then(|p| clamp_percent(p as f64));
        let memory = reading
            .memory
            .and_then(|m| MemoryUsage::from_bytes(m.used_bytes, m.total_bytes));

        Self {
            sequence,
            timestamp: Utc::now(),
            cpu_percent,
            cpu_temperature_c: reading.cpu_temperature_c.filter(|t| t.is_finite()),
            memory,
            cpu_severity: cpu_percent.map(|p| classify(p, thresholds.cpu)),
            memory_severity: memory.map(|m| classify(m.percent, thresholds.memory)),
        }
    }
}

/// Clamp a percentage into [0, 100]; NaN is treated as unavailable.
pub fn clamp_percent(value: f64) -> Option<f32> {
    if value.is_nan() {
        None
    } else {
        Some(value.clamp(0.0, 100.0) as f32)
    }
}
