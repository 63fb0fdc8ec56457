//! Background sampling loop and its lifecycle handle.
//!
//! The loop runs on a dedicated single-worker Tokio runtime. Each cycle samples
//! the source, classifies, publishes into the [`SnapshotStore`], then waits for
//! the configured interval or a stop signal, whichever comes first.
//!
//! Source queries run on the blocking pool. Cancellation is cooperative: a
//! sample already in flight is never interrupted, so shutdown can lag by at
//! most one source query.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::runtime::Runtime;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::classifier::ThresholdConfig;
use super::metrics::{RawReading, Snapshot};
use super::source::MetricSource;
use super::store::SnapshotStore;
use crate::error::{MonitorError, Result};

/// How long `stop` waits for the loop by default
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(1);

/// Lifecycle of a [`SamplerHandle`]. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    Initial,
    Running,
    Stopping,
    Stopped,
}

/// Outcome of [`SamplerHandle::stop`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReport {
    /// Loop exited within the timeout
    Joined,
    /// Loop did not confirm exit in time; its worker was abandoned
    TimedOut { waited: Duration },
    /// The handle was never started
    NeverStarted,
    /// A previous call already stopped the handle
    AlreadyStopped,
}

/// One sampling step: source, classifier, store.
pub struct Sampler {
    source: Box<dyn MetricSource>,
    store: Arc<SnapshotStore>,
    thresholds: ThresholdConfig,
    sequence: u64,
}

impl Sampler {
    pub fn new<S>(store: Arc<SnapshotStore>, source: S, thresholds: ThresholdConfig) -> Self
    where
        S: MetricSource + 'static,
    {
        Self {
            source: Box::new(source),
            store,
            thresholds,
            sequence: 0,
        }
    }

    /// Query the source. A failed query is logged and yields `None`.
    pub fn sample(&mut self) -> Option<RawReading> {
        match self.source.sample() {
            Ok(reading) => Some(reading),
            Err(e) => {
                log::warn!("Skipping sample: {}", e);
                None
            }
        }
    }

    /// Classify a reading and publish it. Returns `false` if the store no
    /// longer accepts updates.
    pub fn publish(&mut self, reading: RawReading) -> Result<bool> {
        let snapshot = Snapshot::from_reading(reading, &self.thresholds, self.sequence + 1);
        let published = self.store.publish_live(snapshot)?;
        if published.is_some() {
            self.sequence += 1;
        }
        Ok(published.is_some())
    }

    /// Run one full cycle and return how long to wait before the next.
    pub fn run_cycle(&mut self) -> Result<Duration> {
        if let Some(reading) = self.sample() {
            self.publish(reading)?;
        }
        Ok(self.store.interval()?.as_duration())
    }
}

/// Owner of the background sampling task.
///
/// `start` may be called once. Calling it again while running returns
/// [`MonitorError::AlreadyRunning`]; after `stop` it returns
/// [`MonitorError::SamplerFinished`]. Create a new handle to restart.
///
/// `stop` blocks the calling thread and must not be called from inside an
/// async runtime.
pub struct SamplerHandle {
    state: Arc<Mutex<SamplerState>>,
    store: Arc<SnapshotStore>,
    sampler: Option<Sampler>,
    runtime: Option<Runtime>,
    task: Option<JoinHandle<Result<()>>>,
    stop_tx: Option<watch::Sender<bool>>,
}

impl SamplerHandle {
    pub fn new<S>(store: Arc<SnapshotStore>, source: S, thresholds: ThresholdConfig) -> Self
    where
        S: MetricSource + 'static,
    {
        Self {
            state: Arc::new(Mutex::new(SamplerState::Initial)),
            store: Arc::clone(&store),
            sampler: Some(Sampler::new(store, source, thresholds)),
            runtime: None,
            task: None,
            stop_tx: None,
        }
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    /// Current lifecycle state. A loop that ended on its own reads as `Stopped`.
    pub fn state(&self) -> SamplerState {
        let state = *self.state.lock();
        let finished = self.task.as_ref().is_some_and(|task| task.is_finished());
        if state == SamplerState::Running && finished {
            SamplerState::Stopped
        } else {
            state
        }
    }

    /// Spawn the sampling loop.
    pub fn start(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        match *state {
            SamplerState::Initial => {}
            SamplerState::Running => return Err(MonitorError::AlreadyRunning),
            SamplerState::Stopping | SamplerState::Stopped => {
                return Err(MonitorError::SamplerFinished)
            }
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_time()
            .thread_name("metrics-sampler")
            .build()
            .map_err(MonitorError::Runtime)?;

        let sampler = self.sampler.take().ok_or(MonitorError::SamplerFinished)?;
        self.store.mark_live()?;

        let (stop_tx, stop_rx) = watch::channel(false);
        let task = runtime.spawn(sampling_loop(sampler, stop_rx, Arc::clone(&self.state)));

        *state = SamplerState::Running;
        self.runtime = Some(runtime);
        self.task = Some(task);
        self.stop_tx = Some(stop_tx);

        log::info!("Sampler started");
        Ok(())
    }

    /// Signal the loop to exit and wait up to `timeout` for it.
    ///
    /// A timeout is not an error: the worker is abandoned, the store is marked
    /// stopped so nothing more is published, and `StopReport::TimedOut` is
    /// returned. A fatal fault that ended the loop earlier is returned as `Err`.
    pub fn stop(&mut self, timeout: Duration) -> Result<StopReport> {
        let Some(task) = self.task.take() else {
            let mut state = self.state.lock();
            let previous = *state;
            *state = SamplerState::Stopped;
            drop(state);

            if previous == SamplerState::Initial {
                self.sampler = None;
                self.store.mark_stopped()?;
                return Ok(StopReport::NeverStarted);
            }
            return Ok(StopReport::AlreadyStopped);
        };

        {
            let mut state = self.state.lock();
            if *state == SamplerState::Running {
                *state = SamplerState::Stopping;
            }
        }

        // Receiver gone means the loop already exited
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
        }
        let marked = self.store.mark_stopped();

        let Some(runtime) = self.runtime.take() else {
            *self.state.lock() = SamplerState::Stopped;
            return Err(MonitorError::SamplerFinished);
        };

        let started = Instant::now();
        let joined = runtime.block_on(async { tokio::time::timeout(timeout, task).await });
        runtime.shutdown_background();
        *self.state.lock() = SamplerState::Stopped;

        match joined {
            Ok(Ok(loop_result)) => {
                loop_result?;
                marked?;
                log::info!("Sampler stopped");
                Ok(StopReport::Joined)
            }
            Ok(Err(join_error)) => {
                log::error!("Sampler task failed: {}", join_error);
                Err(MonitorError::SamplerPanicked(join_error.to_string()))
            }
            Err(_) => {
                let waited = started.elapsed();
                log::warn!(
                    "Sampler did not stop within {:?}; abandoning worker thread",
                    timeout
                );
                marked?;
                Ok(StopReport::TimedOut { waited })
            }
        }
    }
}

impl Drop for SamplerHandle {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
            let _ = self.store.mark_stopped();
        }
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

async fn sampling_loop(
    mut sampler: Sampler,
    mut stop_rx: watch::Receiver<bool>,
    state: Arc<Mutex<SamplerState>>,
) -> Result<()> {
    log::debug!("Sampling loop started");

    let result = loop {
        if *stop_rx.borrow() {
            break Ok(());
        }

        // Source queries block; keep them off the worker that drives the timers
        let cycle = tokio::task::spawn_blocking(move || {
            let outcome = sampler.run_cycle();
            (sampler, outcome)
        })
        .await;

        let wait = match cycle {
            Ok((returned, Ok(wait))) => {
                sampler = returned;
                wait
            }
            Ok((_, Err(e))) => break Err(e),
            Err(join_error) if join_error.is_panic() => {
                std::panic::resume_unwind(join_error.into_panic())
            }
            Err(join_error) => break Err(MonitorError::SamplerPanicked(join_error.to_string())),
        };

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            changed = stop_rx.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
            }
        }
    };

    match &result {
        Ok(()) => log::debug!("Sampling loop exited"),
        Err(e) => log::error!("Sampling loop terminated: {}", e),
    }
    *state.lock() = SamplerState::Stopped;
    result
}
