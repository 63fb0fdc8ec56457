use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::core::system_monitor::{
    IntervalSetting, SamplerHandle, SnapshotStore, SnapshotView, StopReport, SysinfoSource,
    ThresholdConfig,
};

use super::event_handler::MonitorEvent;
use super::render::render_ui;

/// Step applied by the interval keys, matching a 0.1s slider resolution
pub const INTERVAL_STEP_SECS: f64 = 0.1;

/// Monitor application state
pub struct MonitorApp {
    store: Arc<SnapshotStore>,
    pub view: SnapshotView,
    pub interval: IntervalSetting,
    pub should_quit: bool,
    pub show_help: bool,
    /// Fatal store fault; once set the dashboard stops polling
    pub fault: Option<String>,
}

impl MonitorApp {
    pub fn new(store: Arc<SnapshotStore>) -> Self {
        Self {
            store,
            view: SnapshotView::NoData,
            interval: IntervalSetting::default(),
            should_quit: false,
            show_help: false,
            fault: None,
        }
    }

    /// Pull the latest view and interval from the store
    pub fn refresh(&mut self) {
        if self.fault.is_some() {
            return;
        }

        let refreshed = self
            .store
            .view()
            .and_then(|view| Ok((view, self.store.interval()?)));

        match refreshed {
            Ok((view, interval)) => {
                self.view = view;
                self.interval = interval;
            }
            Err(e) => {
                log::error!("Snapshot store unavailable: {}", e);
                self.fault = Some(e.to_string());
            }
        }
    }

    /// Handle keyboard events
    pub fn handle_event(&mut self, event: MonitorEvent) {
        match event {
            MonitorEvent::Quit => self.should_quit = true,
            MonitorEvent::ToggleHelp => self.show_help = !self.show_help,
            MonitorEvent::IntervalUp => self.step_interval(INTERVAL_STEP_SECS),
            MonitorEvent::IntervalDown => self.step_interval(-INTERVAL_STEP_SECS),
            MonitorEvent::None => {}
        }
    }

    fn step_interval(&mut self, delta: f64) {
        let target = ((self.interval.seconds() + delta) * 10.0).round() / 10.0;
        match self.store.set_interval(target) {
            Ok(interval) => self.interval = interval,
            Err(e) => self.fault = Some(e.to_string()),
        }
    }
}

/// Configuration for the monitor app
#[derive(Debug, Clone)]
pub struct MonitorAppConfig {
    pub interval: IntervalSetting,
    pub thresholds: ThresholdConfig,
    pub ui_refresh: Duration,
    pub stop_timeout: Duration,
}

impl Default for MonitorAppConfig {
    fn default() -> Self {
        Self {
            interval: IntervalSetting::default(),
            thresholds: ThresholdConfig::default(),
            ui_refresh: Duration::from_millis(250),
            stop_timeout: Duration::from_secs(1),
        }
    }
}

/// Run the monitor TUI application
pub fn run_monitor_app(config: MonitorAppConfig) -> Result<()> {
    let store = Arc::new(SnapshotStore::with_interval(config.interval.seconds()));
    let mut sampler = SamplerHandle::new(Arc::clone(&store), SysinfoSource::new(), config.thresholds);
    sampler.start().context("Failed to start sampler")?;

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut app = MonitorApp::new(store);
    let ui_result = run_event_loop(&mut terminal, &mut app, config.ui_refresh);

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    let stop_result = sampler.stop(config.stop_timeout);
    ui_result?;

    match stop_result.context("Sampler stopped with a fault")? {
        StopReport::TimedOut { waited } => eprintln!(
            "warning: sampler did not shut down within {:?}; exiting anyway",
            waited
        ),
        StopReport::Joined | StopReport::NeverStarted | StopReport::AlreadyStopped => {}
    }

    Ok(())
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut MonitorApp,
    ui_refresh: Duration,
) -> Result<()> {
    loop {
        app.refresh();
        terminal.draw(|frame| render_ui(frame, app))?;

        if event::poll(ui_refresh).context("Event poll failed")? {
            if let Event::Key(key) = event::read().context("Event read failed")? {
                if key.kind == KeyEventKind::Press {
                    app.handle_event(MonitorEvent::from_key(key.code));
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
