use super::support::{wait_for_sequence, SlowSource, StubSource};
use mtech_monitor::core::system_monitor::{
    SamplerHandle, SamplerState, Severity, SnapshotStore, SnapshotView, StopReport,
    ThresholdConfig, DEFAULT_STOP_TIMEOUT,
};
use mtech_monitor::MonitorError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn started(store: &Arc<SnapshotStore>, source: StubSource) -> SamplerHandle {
    let mut handle = SamplerHandle::new(Arc::clone(store), source, ThresholdConfig::default());
    handle.start().unwrap();
    handle
}

#[test]
fn test_first_cycle_classifies_cpu_as_warning() {
    let store = Arc::new(SnapshotStore::with_interval(0.1));
    let mut handle = started(&store, StubSource::new(70.0, Some(45.0)));

    let snapshot = wait_for_sequence(&store, 1, Duration::from_secs(2)).expect("first snapshot");
    assert_eq!(snapshot.cpu_percent, Some(70.0));
    assert_eq!(snapshot.cpu_severity, Some(Severity::Warning));
    assert_eq!(snapshot.cpu_temperature_c, Some(45.0));

    assert_eq!(handle.stop(DEFAULT_STOP_TIMEOUT).unwrap(), StopReport::Joined);
}

#[test]
fn test_snapshots_keep_flowing_with_newer_timestamps() {
    let store = Arc::new(SnapshotStore::with_interval(0.1));
    assert!(store.snapshot().unwrap().is_none());

    let mut handle = started(&store, StubSource::new(10.0, None));

    let first = wait_for_sequence(&store, 1, Duration::from_secs(2)).expect("first snapshot");
    let later = wait_for_sequence(&store, first.sequence + 2, Duration::from_secs(2))
        .expect("later snapshot");
    assert!(later.timestamp > first.timestamp);

    handle.stop(DEFAULT_STOP_TIMEOUT).unwrap();
}

#[test]
fn test_cpu_changes_are_picked_up_next_cycle() {
    let store = Arc::new(SnapshotStore::with_interval(0.1));
    let source = StubSource::new(20.0, None);
    let cpu = Arc::clone(&source.cpu);
    let mut handle = started(&store, source);

    let first = wait_for_sequence(&store, 1, Duration::from_secs(2)).unwrap();
    assert_eq!(first.cpu_severity, Some(Severity::Normal));

    *cpu.lock().unwrap() = 90.0;
    let deadline = Instant::now() + Duration::from_secs(2);
    let mut severity = first.cpu_severity;
    while Instant::now() < deadline && severity != Some(Severity::Critical) {
        severity = store.snapshot().unwrap().and_then(|s| s.cpu_severity);
        thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(severity, Some(Severity::Critical));

    handle.stop(DEFAULT_STOP_TIMEOUT).unwrap();
}

#[test]
fn test_memory_used_never_exceeds_total() {
    let store = Arc::new(SnapshotStore::with_interval(0.1));
    let mut updates = store.subscribe();
    let mut handle = started(&store, StubSource::new(10.0, None));

    wait_for_sequence(&store, 5, Duration::from_secs(3)).expect("five snapshots");
    handle.stop(DEFAULT_STOP_TIMEOUT).unwrap();

    let last = updates.borrow_and_update().clone().unwrap();
    let memory = last.memory.unwrap();
    assert!(memory.used_bytes <= memory.total_bytes);
    assert_eq!(last.memory_severity, Some(Severity::Critical));
}

#[test]
fn test_missing_temperature_stays_absent() {
    let store = Arc::new(SnapshotStore::with_interval(0.1));
    let mut handle = started(&store, StubSource::new(30.0, None));

    let mut seen = 0;
    let mut last_sequence = 0;
    let deadline = Instant::now() + Duration::from_secs(3);
    while seen < 5 && Instant::now() < deadline {
        if let Some(snapshot) = store.snapshot().unwrap() {
            if snapshot.sequence != last_sequence {
                assert_eq!(snapshot.cpu_temperature_c, None);
                last_sequence = snapshot.sequence;
                seen += 1;
            }
        }
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(seen, 5);

    handle.stop(DEFAULT_STOP_TIMEOUT).unwrap();
}

#[test]
fn test_no_updates_after_stop() {
    let store = Arc::new(SnapshotStore::with_interval(0.1));
    let mut handle = started(&store, StubSource::new(50.0, None));

    wait_for_sequence(&store, 2, Duration::from_secs(2)).unwrap();
    assert_eq!(handle.stop(DEFAULT_STOP_TIMEOUT).unwrap(), StopReport::Joined);
    assert_eq!(handle.state(), SamplerState::Stopped);

    let right_after = store.snapshot().unwrap();
    thread::sleep(Duration::from_millis(350));
    let three_periods_later = store.snapshot().unwrap();

    assert_eq!(right_after, three_periods_later);
    assert!(matches!(store.view().unwrap(), SnapshotView::Stopped(Some(_))));
}

#[test]
fn test_interval_change_applies_after_current_tick() {
    let store = Arc::new(SnapshotStore::with_interval(0.1));
    let mut handle = started(&store, StubSource::new(70.0, None));

    let first = wait_for_sequence(&store, 1, Duration::from_secs(2)).unwrap();
    assert_eq!(first.cpu_severity, Some(Severity::Warning));

    store.set_interval(5.0).unwrap();

    // Let the tick that was already waiting on 0.1s complete
    thread::sleep(Duration::from_millis(400));
    let settled = store.snapshot().unwrap().unwrap();

    thread::sleep(Duration::from_millis(1500));
    let later = store.snapshot().unwrap().unwrap();
    assert_eq!(settled.sequence, later.sequence);

    // Stop interrupts the 5s wait instead of sleeping it out
    let stop_started = Instant::now();
    assert_eq!(handle.stop(DEFAULT_STOP_TIMEOUT).unwrap(), StopReport::Joined);
    assert!(stop_started.elapsed() < Duration::from_millis(900));
}

#[test]
fn test_stop_times_out_on_stuck_source() {
    let store = Arc::new(SnapshotStore::with_interval(0.1));
    let calls = Arc::new(AtomicUsize::new(0));
    let source = SlowSource {
        delay: Duration::from_millis(1500),
        calls: Arc::clone(&calls),
    };
    let mut handle = SamplerHandle::new(Arc::clone(&store), source, ThresholdConfig::default());
    handle.start().unwrap();

    wait_for_sequence(&store, 1, Duration::from_secs(2)).unwrap();
    // Wait until the second, slow call is in flight
    let deadline = Instant::now() + Duration::from_secs(2);
    while calls.load(Ordering::SeqCst) < 2 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }

    let report = handle.stop(Duration::from_millis(200)).unwrap();
    assert!(matches!(report, StopReport::TimedOut { .. }));
    assert_eq!(handle.state(), SamplerState::Stopped);

    // The stuck sample finishing later must not publish
    thread::sleep(Duration::from_millis(1700));
    assert_eq!(store.snapshot().unwrap().unwrap().sequence, 1);
}

#[test]
fn test_lifecycle_transitions() {
    let store = Arc::new(SnapshotStore::with_interval(0.1));
    let mut handle = SamplerHandle::new(Arc::clone(&store), StubSource::new(10.0, None), ThresholdConfig::default());
    assert_eq!(handle.state(), SamplerState::Initial);

    handle.start().unwrap();
    assert_eq!(handle.state(), SamplerState::Running);
    assert!(matches!(handle.start(), Err(MonitorError::AlreadyRunning)));

    assert_eq!(handle.stop(DEFAULT_STOP_TIMEOUT).unwrap(), StopReport::Joined);
    assert_eq!(handle.state(), SamplerState::Stopped);
    assert!(matches!(handle.start(), Err(MonitorError::SamplerFinished)));
    assert_eq!(
        handle.stop(DEFAULT_STOP_TIMEOUT).unwrap(),
        StopReport::AlreadyStopped
    );
}

#[test]
fn test_stop_before_start() {
    let store = Arc::new(SnapshotStore::new());
    let mut handle = SamplerHandle::new(Arc::clone(&store), StubSource::new(10.0, None), ThresholdConfig::default());

    assert_eq!(handle.stop(DEFAULT_STOP_TIMEOUT).unwrap(), StopReport::NeverStarted);
    assert_eq!(handle.state(), SamplerState::Stopped);
    assert!(matches!(handle.start(), Err(MonitorError::SamplerFinished)));
    assert_eq!(store.view().unwrap(), SnapshotView::Stopped(None));
}

#[test]
fn test_readers_do_not_block_on_sampler() {
    let store = Arc::new(SnapshotStore::with_interval(0.1));
    let mut handle = started(&store, StubSource::new(10.0, None));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let deadline = Instant::now() + Duration::from_millis(300);
                while Instant::now() < deadline {
                    if let Some(s) = store.snapshot().unwrap() {
                        assert!(s.memory.unwrap().used_bytes <= s.memory.unwrap().total_bytes);
                    }
                    store.interval().unwrap();
                }
            })
        })
        .collect();

    for reader in readers {
        reader.join().unwrap();
    }
    handle.stop(DEFAULT_STOP_TIMEOUT).unwrap();
}

#[test]
fn test_sysinfo_source_end_to_end() {
    use mtech_monitor::core::system_monitor::SysinfoSource;

    let store = Arc::new(SnapshotStore::with_interval(0.1));
    let mut handle = SamplerHandle::new(Arc::clone(&store), SysinfoSource::new(), ThresholdConfig::default());
    handle.start().unwrap();

    let snapshot = wait_for_sequence(&store, 1, Duration::from_secs(3)).expect("host snapshot");
    if let Some(memory) = snapshot.memory {
        assert!(memory.used_bytes <= memory.total_bytes);
        assert!(snapshot.memory_severity.is_some());
    }
    if let Some(cpu) = snapshot.cpu_percent {
        assert!((0.0..=100.0).contains(&cpu));
    }

    handle.stop(DEFAULT_STOP_TIMEOUT).unwrap();
}

#[test]
fn test_sysinfo_source_honors_short_interval() {
    use mtech_monitor::core::system_monitor::SysinfoSource;

    let store = Arc::new(SnapshotStore::with_interval(0.1));
    let mut handle = SamplerHandle::new(Arc::clone(&store), SysinfoSource::new(), ThresholdConfig::default());
    handle.start().unwrap();

    let first = wait_for_sequence(&store, 1, Duration::from_secs(3)).expect("host snapshot");
    thread::sleep(Duration::from_secs(2));
    let later = store.snapshot().unwrap().unwrap();
    handle.stop(DEFAULT_STOP_TIMEOUT).unwrap();

    // Roughly 20 cycles at 0.1s; a 0.2s floor per cycle would allow only 10
    assert!(
        later.sequence - first.sequence >= 14,
        "only {} snapshots in 2s",
        later.sequence - first.sequence
    );
}
