// Process liveness probing and termination via signals

use crate::error::{Result, TetherError};

#[cfg(unix)]
use nix::errno::Errno;
#[cfg(unix)]
use nix::sys::signal::{kill, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// Signal-level control over another process
pub trait ProcessControl {
    /// Whether a process with this PID currently exists
    fn is_alive(&self, pid: u32) -> bool;

    /// Ask the process to terminate.
    ///
    /// Returns `TetherError::ProcessNotFound` when the process is already gone
    /// and `TetherError::SignalError` for any other delivery failure.
    fn terminate(&self, pid: u32) -> Result<()>;
}

impl<T: ProcessControl + ?Sized> ProcessControl for &T {
    fn is_alive(&self, pid: u32) -> bool {
        (**self).is_alive(pid)
    }

    fn terminate(&self, pid: u32) -> Result<()> {
        (**self).terminate(pid)
    }
}

/// `ProcessControl` backed by `kill(2)`
#[derive(Debug, Default, Clone, Copy)]
pub struct SignalControl;

impl SignalControl {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
fn to_pid(pid: u32) -> Option<Pid> {
    i32::try_from(pid).ok().filter(|p| *p > 0).map(Pid::from_raw)
}

/// Signal 0 only checks existence and permission. Any failure, including
/// EPERM from a process owned by another user, counts as not alive so a
/// recycled PID never pins the record.
#[cfg(unix)]
fn null_signal_ok(result: nix::Result<()>) -> bool {
    result.is_ok()
}

#[cfg(unix)]
impl ProcessControl for SignalControl {
    fn is_alive(&self, pid: u32) -> bool {
        let Some(target) = to_pid(pid) else {
            return false;
        };

        null_signal_ok(kill(target, None))
    }

    fn terminate(&self, pid: u32) -> Result<()> {
        let target = to_pid(pid).ok_or(TetherError::ProcessNotFound(pid))?;

        match kill(target, Signal::SIGTERM) {
            Ok(()) => Ok(()),
            Err(Errno::ESRCH) => Err(TetherError::ProcessNotFound(pid)),
            Err(e) => Err(TetherError::SignalError(format!(
                "Failed to send SIGTERM to {}: {}",
                pid, e
            ))),
        }
    }
}

#[cfg(not(unix))]
impl ProcessControl for SignalControl {
    fn is_alive(&self, _pid: u32) -> bool {
        false
    }

    fn terminate(&self, _pid: u32) -> Result<()> {
        Err(TetherError::SignalError(
            "Stopping the daemon is only supported on Unix systems".to_string(),
        ))
    }
}
