use std::io;
use thiserror::Error;

/// Error type for the monitor core
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Metric source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Snapshot store lock poisoned; sampler state is no longer trustworthy")]
    StorePoisoned,

    #[error("Sampler is already running")]
    AlreadyRunning,

    #[error("Sampler has already been stopped; create a new handle to restart")]
    SamplerFinished,

    #[error("Sampler task panicked: {0}")]
    SamplerPanicked(String),

    #[error("Failed to build sampler runtime: {0}")]
    Runtime(io::Error),
}

/// Result type alias for the monitor core
pub type Result<T> = std::result::Result<T, MonitorError>;

impl MonitorError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        MonitorError::Config(msg.into())
    }

    pub fn source_unavailable<S: Into<String>>(msg: S) -> Self {
        MonitorError::SourceUnavailable(msg.into())
    }
}
