//! Terminal User Interface for system monitoring.
//!
//! Polls the snapshot store on its own cadence and renders it using ratatui.

mod app;
mod event_handler;
mod render;
mod widgets;

pub use app::{run_monitor_app, MonitorApp, MonitorAppConfig, INTERVAL_STEP_SECS};
pub use event_handler::MonitorEvent;
