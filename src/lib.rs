// MTech Monitor Library - Public API

// Re-export error types
pub mod error;
pub use error::{MonitorError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod ui;

// Re-export commonly used types
pub use crate::core::config::Config;
pub use crate::core::system_monitor::{SamplerHandle, Snapshot, SnapshotStore, SnapshotView};

/// Where the process sends its primary output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Full-screen dashboard owns the terminal
    Dashboard,
    /// Line-oriented output on stdout; stderr is free for logs
    Stream,
}

/// Filter used when `RUST_LOG` is not set. The dashboard stays silent so log
/// lines never land inside the alternate screen.
pub fn default_log_filter(mode: OutputMode) -> &'static str {
    match mode {
        OutputMode::Dashboard => "off",
        OutputMode::Stream => "warn",
    }
}

// Initialize logging; RUST_LOG overrides the per-mode default.
pub fn init_logging(mode: OutputMode) {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_log_filter(mode)),
    )
    .init();
}
