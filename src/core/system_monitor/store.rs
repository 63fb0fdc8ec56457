//! Shared holder of the latest snapshot and the sampling interval.
//!
//! One short-held `RwLock` guards an `Arc<Snapshot>` swap, so readers always see
//! either the previous or the next snapshot in full. A `watch` channel mirrors
//! every publish for consumers that prefer push over polling.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::metrics::Snapshot;
use crate::error::{MonitorError, Result};

pub const MIN_INTERVAL_SECS: f64 = 0.1;
pub const MAX_INTERVAL_SECS: f64 = 5.0;
pub const DEFAULT_INTERVAL_SECS: f64 = 1.0;

/// Sampling interval in seconds, always within [`MIN_INTERVAL_SECS`, `MAX_INTERVAL_SECS`]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct IntervalSetting(f64);

impl IntervalSetting {
    /// Clamp into range; non-finite input falls back to the default.
    pub fn new(seconds: f64) -> Self {
        if seconds.is_finite() {
            Self(seconds.clamp(MIN_INTERVAL_SECS, MAX_INTERVAL_SECS))
        } else {
            Self::default()
        }
    }

    pub fn seconds(&self) -> f64 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs_f64(self.0)
    }
}

impl Default for IntervalSetting {
    fn default() -> Self {
        Self(DEFAULT_INTERVAL_SECS)
    }
}

impl From<f64> for IntervalSetting {
    fn from(seconds: f64) -> Self {
        Self::new(seconds)
    }
}

impl From<IntervalSetting> for f64 {
    fn from(interval: IntervalSetting) -> Self {
        interval.0
    }
}

/// Whether the sampler feeding this store is publishing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedState {
    #[default]
    Idle,
    Live,
    Stopped,
}

/// What a presentation layer should render
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotView {
    /// Nothing published yet
    NoData,
    /// Sampler running; the snapshot may still carry absent (unavailable) fields
    Live(Arc<Snapshot>),
    /// Sampler no longer updating; the last snapshot, if any, is stale
    Stopped(Option<Arc<Snapshot>>),
}

#[derive(Debug, Default)]
struct StoreState {
    latest: Option<Arc<Snapshot>>,
    interval: IntervalSetting,
    feed: FeedState,
}

/// Latest snapshot, interval setting and feed state, shared between the
/// sampler and its readers.
#[derive(Debug)]
pub struct SnapshotStore {
    state: RwLock<StoreState>,
    notifier: watch::Sender<Option<Arc<Snapshot>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::with_interval(DEFAULT_INTERVAL_SECS)
    }

    pub fn with_interval(seconds: f64) -> Self {
        let (notifier, _) = watch::channel(None);
        Self {
            state: RwLock::new(StoreState {
                interval: IntervalSetting::new(seconds),
                ..Default::default()
            }),
            notifier,
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>> {
        self.state.read().map_err(|_| MonitorError::StorePoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>> {
        self.state.write().map_err(|_| MonitorError::StorePoisoned)
    }

    /// Most recent snapshot; `None` until the first cycle has published.
    pub fn snapshot(&self) -> Result<Option<Arc<Snapshot>>> {
        Ok(self.read()?.latest.clone())
    }

    /// Replace the latest snapshot and notify subscribers.
    pub fn set_snapshot(&self, snapshot: Snapshot) -> Result<Arc<Snapshot>> {
        let snapshot = Arc::new(snapshot);
        self.write()?.latest = Some(Arc::clone(&snapshot));
        self.notifier.send_replace(Some(Arc::clone(&snapshot)));
        Ok(snapshot)
    }

    /// Publish on behalf of the sampler. Dropped (returns `None`) once the feed
    /// has been marked stopped, so a late cycle cannot overwrite the final state.
    pub fn publish_live(&self, snapshot: Snapshot) -> Result<Option<Arc<Snapshot>>> {
        let snapshot = Arc::new(snapshot);
        {
            let mut state = self.write()?;
            if state.feed == FeedState::Stopped {
                return Ok(None);
            }
            state.latest = Some(Arc::clone(&snapshot));
        }
        self.notifier.send_replace(Some(Arc::clone(&snapshot)));
        Ok(Some(snapshot))
    }

    pub fn interval(&self) -> Result<IntervalSetting> {
        Ok(self.read()?.interval)
    }

    /// Store a new interval, clamped into range. Returns the value actually stored.
    pub fn set_interval(&self, seconds: f64) -> Result<IntervalSetting> {
        let interval = IntervalSetting::new(seconds);
        if interval.seconds() != seconds {
            log::debug!(
                "Interval {}s clamped to {}s",
                seconds,
                interval.seconds()
            );
        }
        self.write()?.interval = interval;
        Ok(interval)
    }

    pub fn feed_state(&self) -> Result<FeedState> {
        Ok(self.read()?.feed)
    }

    pub fn mark_live(&self) -> Result<()> {
        self.write()?.feed = FeedState::Live;
        Ok(())
    }

    pub fn mark_stopped(&self) -> Result<()> {
        self.write()?.feed = FeedState::Stopped;
        Ok(())
    }

    /// Snapshot and feed state read under one lock.
    pub fn view(&self) -> Result<SnapshotView> {
        let state = self.read()?;
        Ok(match (state.feed, &state.latest) {
            (FeedState::Stopped, latest) => SnapshotView::Stopped(latest.clone()),
            (_, Some(snapshot)) => SnapshotView::Live(Arc::clone(snapshot)),
            (_, None) => SnapshotView::NoData,
        })
    }

    /// Receiver that wakes on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.notifier.subscribe()
    }

    /// Poison the lock by panicking while holding the write guard.
    #[cfg(test)]
    pub(crate) fn poison(self: &Arc<Self>) {
        let store = Arc::clone(self);
        let _ = std::thread::spawn(move || {
            let _guard = store.state.write();
            panic!("poisoning snapshot store for test");
        })
        .join();
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
