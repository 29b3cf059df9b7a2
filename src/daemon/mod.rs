// Daemon module - Single background agent per installation

pub mod launcher;
pub mod manager;
pub mod pid;
pub mod runner;
pub mod signal;

pub use launcher::{DaemonLauncher, DetachedLauncher, LaunchRequest, DAEMON_ENV};
pub use manager::{DaemonManager, DaemonStatus, StopOutcome};
pub use pid::{PidFile, PidStore};
pub use signal::{ProcessControl, SignalControl};
