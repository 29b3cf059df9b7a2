// Installation paths - private directory, logs, PID and config files

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the private directory
pub const HOME_ENV: &str = "TETHER_HOME";

const PID_FILE_NAME: &str = "daemon.pid";
const LOG_DIR_NAME: &str = "logs";
const LOG_FILE_NAME: &str = "daemon.log";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Resolved locations of everything tether keeps on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TetherPaths {
    home: PathBuf,
}

impl TetherPaths {
    /// Resolve paths from `$TETHER_HOME`, falling back to `~/.tether`
    pub fn resolve() -> Self {
        let home = if let Ok(dir) = std::env::var(HOME_ENV) {
            PathBuf::from(dir)
        } else if let Some(home) = dirs::home_dir() {
            home.join(".tether")
        } else {
            PathBuf::from(".tether")
        };
        Self { home }
    }

    /// Use an explicit private directory
    pub fn with_home<P: AsRef<Path>>(home: P) -> Self {
        Self {
            home: home.as_ref().to_path_buf(),
        }
    }

    pub fn private_dir(&self) -> &Path {
        &self.home
    }

    pub fn log_dir(&self) -> PathBuf {
        self.home.join(LOG_DIR_NAME)
    }

    pub fn pid_file(&self) -> PathBuf {
        self.home.join(PID_FILE_NAME)
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir().join(LOG_FILE_NAME)
    }

    pub fn config_file(&self) -> PathBuf {
        self.home.join(CONFIG_FILE_NAME)
    }

    /// Create the log directory (and the private directory above it) if missing
    pub fn ensure_log_dir(&self) -> Result<PathBuf> {
        let dir = self.log_dir();
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
