//! System monitor command handler.
//!
//! Runs the sampler behind either the TUI dashboard or a JSON line stream.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::core::config::Config;
use crate::core::system_monitor::{SamplerHandle, SnapshotStore, StopReport, SysinfoSource};
use crate::ui::monitor_tui::{run_monitor_app, MonitorAppConfig};

/// Execute the monitor command
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;

    if let Some(&interval) = matches.get_one::<f64>("interval") {
        let stored = config.set_interval(interval);
        if stored.seconds() != interval {
            log::warn!("Interval {}s out of range, using {}s", interval, stored.seconds());
        }
    }

    if matches.get_flag("json") {
        let samples = matches.get_one::<u64>("samples").copied();
        return run_json_output(&config, samples);
    }

    let app_config = MonitorAppConfig {
        interval: config.interval_secs,
        thresholds: config.thresholds,
        ui_refresh: config.ui_refresh(),
        stop_timeout: config.stop_timeout(),
    };

    run_monitor_app(app_config).context("Failed to run system monitor")
}

/// Run in JSON output mode (for scripting)
fn run_json_output(config: &Config, samples: Option<u64>) -> Result<()> {
    let store = Arc::new(SnapshotStore::with_interval(config.interval_secs.seconds()));
    let mut updates = store.subscribe();
    let mut sampler = SamplerHandle::new(Arc::clone(&store), SysinfoSource::new(), config.thresholds);

    let (quit_tx, mut quit_rx) = tokio::sync::watch::channel(false);
    ctrlc::set_handler(move || {
        let _ = quit_tx.send(true);
    })
    .context("Failed to install Ctrl-C handler")?;

    sampler.start().context("Failed to start sampler")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .context("Failed to build output runtime")?;

    let streamed = runtime.block_on(async {
        let mut printed = 0u64;
        loop {
            tokio::select! {
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let latest = updates.borrow_and_update().clone();
                    if let Some(snapshot) = latest {
                        println!("{}", serde_json::to_string(snapshot.as_ref())?);
                        printed += 1;
                    }
                    if samples.is_some_and(|limit| printed >= limit) {
                        break;
                    }
                }
                _ = quit_rx.changed() => break,
            }
        }
        Ok::<u64, anyhow::Error>(printed)
    });

    let stop_result = sampler.stop(config.stop_timeout());
    let printed = streamed?;
    log::debug!("Streamed {} snapshots", printed);

    if let StopReport::TimedOut { waited } = stop_result.context("Sampler stopped with a fault")? {
        eprintln!(
            "warning: sampler did not shut down within {:?}; exiting anyway",
            waited
        );
    }

    Ok(())
}
