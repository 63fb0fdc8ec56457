//! Metric sources.
//!
//! A [`MetricSource`] produces one [`RawReading`] per call. Fields the platform
//! cannot provide are left absent instead of failing the whole sample.

use std::time::{Duration, Instant};

use sysinfo::{Components, CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

use super::metrics::{clamp_percent, MemoryUsage, RawReading};
use crate::error::{MonitorError, Result};

/// Sensor chip exposing one reading per core (Intel `coretemp`)
pub const MULTI_CORE_SENSOR_GROUP: &str = "coretemp";
/// Sensor chip exposing a single combined reading (Raspberry Pi `cpu_thermal`)
pub const SINGLE_SENSOR_GROUP: &str = "cpu_thermal";

/// Something that can be polled for host metrics.
///
/// `Err` means nothing at all could be measured; partial data is `Ok` with
/// absent fields.
pub trait MetricSource: Send {
    fn sample(&mut self) -> Result<RawReading>;
}

/// A single temperature sensor reading tagged with its chip name
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    pub group: String,
    pub celsius: f32,
}

impl SensorReading {
    pub fn new<S: Into<String>>(group: S, celsius: f32) -> Self {
        Self {
            group: group.into(),
            celsius,
        }
    }

    /// Component labels look like `"coretemp Core 0"`; the first token is the chip.
    pub fn from_label(label: &str, celsius: f32) -> Self {
        let group = label.split_whitespace().next().unwrap_or_default();
        Self::new(group, celsius)
    }
}

/// Pick the CPU temperature out of all sensor readings.
///
/// Mean of the per-core group when present, otherwise the first reading of the
/// combined sensor, otherwise `None`.
pub fn cpu_temperature(readings: &[SensorReading]) -> Option<f32> {
    let cores: Vec<f32> = group_readings(readings, MULTI_CORE_SENSOR_GROUP).collect();
    if !cores.is_empty() {
        return Some(cores.iter().sum::<f32>() / cores.len() as f32);
    }

    group_readings(readings, SINGLE_SENSOR_GROUP).next()
}

fn group_readings<'a>(
    readings: &'a [SensorReading],
    group: &'a str,
) -> impl Iterator<Item = f32> + 'a {
    readings
        .iter()
        .filter(move |r| r.group == group && r.celsius.is_finite())
        .map(|r| r.celsius)
}

/// Metric source backed by `sysinfo`.
///
/// CPU usage is the delta between consecutive calls, so it covers the window
/// since the previous sample. Only the first call waits for sysinfo's minimum
/// CPU window; later calls refresh immediately.
pub struct SysinfoSource {
    system: System,
    components: Components,
    baseline_at: Instant,
    cpu_primed: bool,
}

impl SysinfoSource {
    pub fn new() -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::nothing().with_cpu_usage())
            .with_memory(MemoryRefreshKind::nothing().with_ram());

        // Constructing with specifics performs the baseline CPU refresh
        let system = System::new_with_specifics(refresh_kind);
        let components = Components::new_with_refreshed_list();

        Self {
            system,
            components,
            baseline_at: Instant::now(),
            cpu_primed: false,
        }
    }

    /// Before the first sample, sleep out the rest of sysinfo's minimum CPU
    /// window measured from the baseline refresh.
    fn prime_cpu_window(&mut self) {
        if self.cpu_primed {
            return;
        }
        if let Some(remaining) = cpu_window_remaining(self.baseline_at.elapsed()) {
            std::thread::sleep(remaining);
        }
        self.cpu_primed = true;
    }

    fn sensor_readings(&self) -> Vec<SensorReading> {
        self.components
            .iter()
            .filter_map(|comp| {
                comp.temperature()
                    .map(|celsius| SensorReading::from_label(comp.label(), celsius))
            })
            .collect()
    }
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricSource for SysinfoSource {
    fn sample(&mut self) -> Result<RawReading> {
        self.prime_cpu_window();

        self.system.refresh_cpu_usage();
        self.system.refresh_memory();
        self.components.refresh(false);

        let reading = RawReading {
            cpu_percent: clamp_percent(self.system.global_cpu_usage() as f64),
            cpu_temperature_c: cpu_temperature(&self.sensor_readings()),
            memory: MemoryUsage::from_bytes(self.system.used_memory(), self.system.total_memory()),
        };

        log::trace!("sysinfo sample: {:?}", reading);
        require_any_metric(reading)
    }
}

fn cpu_window_remaining(elapsed: Duration) -> Option<Duration> {
    sysinfo::MINIMUM_CPU_UPDATE_INTERVAL
        .checked_sub(elapsed)
        .filter(|remaining| !remaining.is_zero())
}

/// A reading with every field absent means the host gave us nothing.
fn require_any_metric(reading: RawReading) -> Result<RawReading> {
    if reading.is_empty() {
        return Err(MonitorError::source_unavailable(
            "no CPU, temperature or memory metric could be read",
        ));
    }
    Ok(reading)
}
