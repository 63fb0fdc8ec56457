//! System monitoring core functionality.
//!
//! This module samples CPU usage, CPU temperature and memory usage on a
//! background task and publishes classified snapshots for presentation.

pub mod classifier;
mod metrics;
pub mod sampler;
pub mod source;
pub mod store;

pub use classifier::{classify, Severity, ThresholdConfig, Thresholds};
pub use metrics::{MemoryUsage, RawReading, Snapshot};
pub use sampler::{Sampler, SamplerHandle, SamplerState, StopReport, DEFAULT_STOP_TIMEOUT};
pub use source::{cpu_temperature, MetricSource, SensorReading, SysinfoSource};
pub use store::{
    FeedState, IntervalSetting, SnapshotStore, SnapshotView, DEFAULT_INTERVAL_SECS,
    MAX_INTERVAL_SECS, MIN_INTERVAL_SECS,
};
