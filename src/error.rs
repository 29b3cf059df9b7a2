use thiserror::Error;

/// Main error type for tether
#[derive(Debug, Error)]
pub enum TetherError {
    // Daemon lifecycle errors
    #[error("Failed to spawn daemon: {0}")]
    SpawnError(String),

    #[error("Process not found: {0}")]
    ProcessNotFound(u32),

    #[error("Signal error: {0}")]
    SignalError(String),

    #[error("Daemon (PID: {pid}) still running {secs}s after SIGTERM")]
    StopTimeout { pid: u32, secs: u64 },

    #[error("Daemon already running (PID: {0})")]
    DaemonAlreadyRunning(u32),

    // Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid configuration file: {0}")]
    InvalidConfig(String),

    // Heartbeat transport errors
    #[error("Heartbeat failed: {0}")]
    HeartbeatError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for TetherError {
    fn from(e: reqwest::Error) -> Self {
        TetherError::HeartbeatError(e.to_string())
    }
}

/// Result type alias for tether operations
pub type Result<T> = std::result::Result<T, TetherError>;
