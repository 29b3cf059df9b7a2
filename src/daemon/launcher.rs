// Detached launch of the daemon process

use crate::error::{Result, TetherError};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Environment variable telling a re-invoked process it already is the daemon
pub const DAEMON_ENV: &str = "TETHER_DAEMON";

/// Everything needed to start the daemon process
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    /// Executable to run, normally the current one
    pub program: PathBuf,

    /// Arguments selecting daemon foreground mode
    pub args: Vec<String>,

    /// File receiving both stdout and stderr, opened in append mode
    pub log_file: PathBuf,
}

impl LaunchRequest {
    /// Re-invoke the current executable as `daemon run`
    pub fn current_exe(log_file: PathBuf, verbose: bool) -> Result<Self> {
        let program = std::env::current_exe().map_err(|e| {
            TetherError::SpawnError(format!("Failed to resolve current executable: {}", e))
        })?;

        let mut args = vec!["daemon".to_string(), "run".to_string()];
        if verbose {
            args.push("--verbose".to_string());
        }

        Ok(Self {
            program,
            args,
            log_file,
        })
    }
}

/// Starts a process that outlives the caller
pub trait DaemonLauncher {
    /// Start the process and return its PID if the OS reported one
    fn launch(&self, request: &LaunchRequest) -> Result<Option<u32>>;
}

/// Launches the daemon in its own session with output sent to a log file
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedLauncher;

impl DetachedLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl DaemonLauncher for DetachedLauncher {
    fn launch(&self, request: &LaunchRequest) -> Result<Option<u32>> {
        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&request.log_file)
            .map_err(|e| {
                TetherError::SpawnError(format!(
                    "Failed to open log file {}: {}",
                    request.log_file.display(),
                    e
                ))
            })?;
        let log_err = log.try_clone()?;

        let mut command = Command::new(&request.program);
        command
            .args(&request.args)
            .env(DAEMON_ENV, "1")
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err));

        // New session: no controlling terminal, not in the caller's process group
        #[cfg(unix)]
        unsafe {
            command.pre_exec(|| {
                nix::unistd::setsid()?;
                Ok(())
            });
        }

        let child = command.spawn().map_err(|e| {
            TetherError::SpawnError(format!(
                "Failed to spawn {}: {}",
                request.program.display(),
                e
            ))
        })?;

        // Closes the parent's copies of the log descriptors
        drop(command);

        let pid = child.id();
        debug!("Launched daemon process {:?}", pid);

        // Released without waiting; the child keeps running on its own
        drop(child);

        Ok(pid)
    }
}
