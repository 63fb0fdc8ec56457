// Stub metric sources and polling helpers shared by the integration tests

use mtech_monitor::core::system_monitor::{MemoryUsage, MetricSource, RawReading, Snapshot, SnapshotStore};
use mtech_monitor::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Source whose CPU value can be changed while the sampler runs
pub struct StubSource {
    pub cpu: Arc<Mutex<f32>>,
    pub temperature: Option<f32>,
    pub calls: Arc<AtomicUsize>,
}

impl StubSource {
    pub fn new(cpu: f32, temperature: Option<f32>) -> Self {
        Self {
            cpu: Arc::new(Mutex::new(cpu)),
            temperature,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl MetricSource for StubSource {
    fn sample(&mut self) -> Result<RawReading> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) as u64;
        Ok(RawReading {
            cpu_percent: Some(*self.cpu.lock().unwrap()),
            cpu_temperature_c: self.temperature,
            // From the third call on, used exceeds total
            memory: Some(MemoryUsage {
                used_bytes: 1_000 + call * 700,
                total_bytes: 2_000,
                percent: 0.0,
            }),
        })
    }
}

/// Source that blocks on every call after the first
pub struct SlowSource {
    pub delay: Duration,
    pub calls: Arc<AtomicUsize>,
}

impl MetricSource for SlowSource {
    fn sample(&mut self) -> Result<RawReading> {
        if self.calls.fetch_add(1, Ordering::SeqCst) > 0 {
            std::thread::sleep(self.delay);
        }
        Ok(RawReading {
            cpu_percent: Some(20.0),
            ..Default::default()
        })
    }
}

/// Poll the store until a snapshot with at least `min_sequence` shows up.
pub fn wait_for_sequence(
    store: &SnapshotStore,
    min_sequence: u64,
    timeout: Duration,
) -> Option<Arc<Snapshot>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(snapshot) = store.snapshot().unwrap() {
            if snapshot.sequence >= min_sequence {
                return Some(snapshot);
            }
        }
        if Instant::now() >= deadline {
            return None;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
}
