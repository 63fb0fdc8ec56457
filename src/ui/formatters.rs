use chrono::{DateTime, Local, Utc};

use crate::core::system_monitor::MemoryUsage;

/// Placeholder for a metric the platform could not provide
pub const UNAVAILABLE: &str = "N/A";

/// Format a percentage with one decimal, or `N/A`
pub fn format_percent(value: Option<f32>) -> String {
    match value {
        Some(v) => format!("{:.1}%", v),
        None => UNAVAILABLE.to_string(),
    }
}

/// Format a CPU temperature, or `N/A` when no sensor is present
pub fn format_temperature(celsius: Option<f32>) -> String {
    match celsius {
        Some(t) => format!("{:.1}°C", t),
        None => UNAVAILABLE.to_string(),
    }
}

/// Format memory usage as `42.0% (3400MB / 8000MB)`
pub fn format_memory(memory: Option<&MemoryUsage>) -> String {
    match memory {
        Some(m) => format!("{:.1}% ({}MB / {}MB)", m.percent, m.used_mb(), m.total_mb()),
        None => UNAVAILABLE.to_string(),
    }
}

/// Format a snapshot timestamp in local time (HH:MM:SS)
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    let local: DateTime<Local> = timestamp.into();
    local.format("%H:%M:%S").to_string()
}
