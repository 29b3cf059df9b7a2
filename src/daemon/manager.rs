// Daemon lifecycle management

use super::launcher::{DaemonLauncher, DetachedLauncher, LaunchRequest};
use super::pid::{PidFile, PidStore};
use super::signal::{ProcessControl, SignalControl};
use crate::error::{Result, TetherError};
use crate::paths::TetherPaths;
use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Interval between liveness checks while waiting for an exit
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Daemon manager for controlling daemon lifecycle
///
/// Holds no state of its own: every query re-reads the PID record, so a stale
/// record left behind by a crashed daemon is cleaned up by whoever looks next.
pub struct DaemonManager<S = PidFile, C = SignalControl, L = DetachedLauncher> {
    store: S,
    control: C,
    launcher: L,
    log_file: PathBuf,
}

impl DaemonManager {
    /// Create a daemon manager for the given installation paths
    pub fn new(paths: &TetherPaths) -> Self {
        Self::with_parts(
            PidFile::with_path(paths.pid_file()),
            SignalControl::new(),
            DetachedLauncher::new(),
            paths.log_file(),
        )
    }
}

impl<S, C, L> DaemonManager<S, C, L>
where
    S: PidStore,
    C: ProcessControl,
    L: DaemonLauncher,
{
    pub fn with_parts(store: S, control: C, launcher: L, log_file: PathBuf) -> Self {
        Self {
            store,
            control,
            launcher,
            log_file,
        }
    }

    /// Get the PID of the running daemon, if any.
    ///
    /// A record pointing at a dead process is removed before returning `None`.
    pub fn get_pid(&self) -> Option<u32> {
        let pid = self.store.read()?;

        if self.control.is_alive(pid) {
            return Some(pid);
        }

        debug!("Removing stale PID file for dead process {}", pid);
        self.store.remove();
        None
    }

    /// Spawn the daemon as a detached process and record its PID
    pub fn spawn(&self, verbose: bool) -> Result<u32> {
        let request = LaunchRequest::current_exe(self.log_file.clone(), verbose)?;
        self.spawn_with(&request)
    }

    /// Spawn the daemon from an explicit launch request
    pub fn spawn_with(&self, request: &LaunchRequest) -> Result<u32> {
        let pid = self.launcher.launch(request)?.ok_or_else(|| {
            TetherError::SpawnError(format!(
                "No PID reported for {}",
                request.program.display()
            ))
        })?;

        self.store.write(pid)?;
        info!("Daemon spawned with PID {}", pid);
        Ok(pid)
    }

    /// Stop the daemon by sending SIGTERM.
    ///
    /// Returns `true` only if this call delivered the signal. A daemon that
    /// vanished between the liveness check and the signal still has its
    /// record removed, but yields `false`.
    pub fn stop(&self) -> Result<bool> {
        let Some(pid) = self.get_pid() else {
            return Ok(false);
        };
        self.terminate(pid)
    }

    /// Stop the daemon and wait up to `timeout` for it to exit.
    ///
    /// A daemon still alive after the timeout gets its record written back and
    /// the call fails with `StopTimeout`, so it stays tracked and cannot be
    /// started twice.
    pub fn stop_and_wait(&self, timeout: Duration) -> Result<StopOutcome> {
        let Some(pid) = self.get_pid() else {
            return Ok(StopOutcome::NotRunning);
        };

        if !self.terminate(pid)? {
            return Ok(StopOutcome::AlreadyExited(pid));
        }

        if self.wait_for_exit(pid, timeout) {
            return Ok(StopOutcome::Stopped(pid));
        }

        warn!("Daemon {} ignored SIGTERM for {:?}", pid, timeout);
        self.store.write(pid)?;
        Err(TetherError::StopTimeout {
            pid,
            secs: timeout.as_secs(),
        })
    }

    fn terminate(&self, pid: u32) -> Result<bool> {
        match self.control.terminate(pid) {
            Ok(()) => {
                self.store.remove();
                info!("Sent SIGTERM to daemon (PID: {})", pid);
                Ok(true)
            }
            Err(TetherError::ProcessNotFound(_)) => {
                self.store.remove();
                debug!("Daemon {} exited before it could be signalled", pid);
                Ok(false)
            }
            Err(e) => {
                warn!("Failed to stop daemon {}: {}", pid, e);
                Err(e)
            }
        }
    }

    /// Poll until `pid` has exited or `timeout` elapses. Returns whether it exited.
    pub fn wait_for_exit(&self, pid: u32, timeout: Duration) -> bool {
        let start = Instant::now();
        loop {
            if !self.control.is_alive(pid) {
                return true;
            }
            if start.elapsed() >= timeout {
                return false;
            }
            std::thread::sleep(EXIT_POLL_INTERVAL);
        }
    }

    /// Record `pid` as the daemon, failing if another live daemon is recorded
    pub fn register(&self, pid: u32) -> Result<()> {
        if let Some(existing) = self.get_pid() {
            if existing != pid {
                return Err(TetherError::DaemonAlreadyRunning(existing));
            }
        }
        self.store.write(pid)
    }

    /// Remove the record only if it still names `pid`
    pub fn release(&self, pid: u32) {
        if self.store.read() == Some(pid) {
            self.store.remove();
        }
    }

    /// Get daemon status information
    pub fn status(&self) -> DaemonStatus {
        let pid = self.get_pid();
        let started_at = pid.and_then(|_| {
            std::fs::metadata(self.store.path())
                .and_then(|m| m.modified())
                .ok()
                .map(DateTime::<Local>::from)
        });

        DaemonStatus {
            running: pid.is_some(),
            pid,
            pid_file: self.store.path().to_path_buf(),
            log_file: self.log_file.clone(),
            started_at,
        }
    }
}

/// What `stop_and_wait` found and did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// No live daemon was recorded
    NotRunning,
    /// The daemon exited before SIGTERM reached it
    AlreadyExited(u32),
    /// SIGTERM was delivered and the process exited
    Stopped(u32),
}

/// Daemon status information
#[derive(Debug, Clone)]
pub struct DaemonStatus {
    pub running: bool,
    pub pid: Option<u32>,
    pub pid_file: PathBuf,
    pub log_file: PathBuf,
    pub started_at: Option<DateTime<Local>>,
}
