// Integration tests for the daemon supervisor against a real PID file

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use tether::daemon::{
    DaemonLauncher, DaemonManager, LaunchRequest, PidFile, PidStore, ProcessControl,
};
use tether::error::{Result, TetherError};

struct ScriptedControl {
    alive: bool,
    terminate: fn(u32) -> Result<()>,
    signalled: RefCell<Vec<u32>>,
}

impl ScriptedControl {
    fn new(alive: bool, terminate: fn(u32) -> Result<()>) -> Self {
        Self {
            alive,
            terminate,
            signalled: RefCell::new(Vec::new()),
        }
    }
}

impl ProcessControl for ScriptedControl {
    fn is_alive(&self, _pid: u32) -> bool {
        self.alive
    }

    fn terminate(&self, pid: u32) -> Result<()> {
        self.signalled.borrow_mut().push(pid);
        (self.terminate)(pid)
    }
}

struct FixedLauncher(Option<u32>);

impl DaemonLauncher for FixedLauncher {
    fn launch(&self, _request: &LaunchRequest) -> Result<Option<u32>> {
        Ok(self.0)
    }
}

fn delivered(_pid: u32) -> Result<()> {
    Ok(())
}

fn not_found(pid: u32) -> Result<()> {
    Err(TetherError::ProcessNotFound(pid))
}

fn permission_denied(pid: u32) -> Result<()> {
    Err(TetherError::SignalError(format!(
        "Failed to send SIGTERM to {}: EPERM",
        pid
    )))
}

fn setup(
    content: Option<&str>,
    control: ScriptedControl,
    launched: Option<u32>,
) -> (TempDir, PathBuf, DaemonManager<PidFile, ScriptedControl, FixedLauncher>) {
    let temp_dir = TempDir::new().unwrap();
    let pid_path = temp_dir.path().join("daemon.pid");
    if let Some(content) = content {
        fs::write(&pid_path, content).unwrap();
    }

    let manager = DaemonManager::with_parts(
        PidFile::with_path(&pid_path),
        control,
        FixedLauncher(launched),
        temp_dir.path().join("daemon.log"),
    );
    (temp_dir, pid_path, manager)
}

fn request(log_file: PathBuf) -> LaunchRequest {
    LaunchRequest {
        program: PathBuf::from("/usr/local/bin/tether"),
        args: vec!["daemon".to_string(), "run".to_string()],
        log_file,
    }
}

#[test]
fn test_spawn_when_no_daemon_records_pid() {
    let (temp_dir, pid_path, manager) =
        setup(None, ScriptedControl::new(true, delivered), Some(12345));

    assert_eq!(manager.get_pid(), None);
    let pid = manager
        .spawn_with(&request(temp_dir.path().join("daemon.log")))
        .unwrap();

    assert_eq!(pid, 12345);
    assert_eq!(PidFile::with_path(&pid_path).read(), Some(12345));
}

#[test]
fn test_stale_pid_file_is_cleaned_up_on_query() {
    let (_temp_dir, pid_path, manager) =
        setup(Some("5555"), ScriptedControl::new(false, delivered), None);

    assert_eq!(manager.get_pid(), None);
    assert!(!pid_path.exists());
}

#[test]
fn test_record_of_foreign_process_is_treated_as_stale() {
    // A recycled PID now owned by another user fails the null signal with
    // EPERM, which reads as not alive
    let temp_dir = TempDir::new().unwrap();
    let pid_path = temp_dir.path().join("daemon.pid");
    fs::write(&pid_path, "4242").unwrap();
    let control = ScriptedControl::new(false, permission_denied);

    let manager = DaemonManager::with_parts(
        PidFile::with_path(&pid_path),
        &control,
        FixedLauncher(Some(4343)),
        temp_dir.path().join("daemon.log"),
    );

    assert_eq!(manager.get_pid(), None);
    assert!(!pid_path.exists());

    fs::write(&pid_path, "4242").unwrap();
    assert!(!manager.stop().unwrap());
    assert!(control.signalled.borrow().is_empty());
    assert!(!pid_path.exists());

    let pid = manager
        .spawn_with(&request(temp_dir.path().join("daemon.log")))
        .unwrap();
    assert_eq!(pid, 4343);
    assert_eq!(PidFile::with_path(&pid_path).read(), Some(4343));
}

#[test]
fn test_stop_running_daemon() {
    let (_temp_dir, pid_path, manager) =
        setup(Some("7777"), ScriptedControl::new(true, delivered), None);

    assert!(manager.stop().unwrap());
    assert!(!pid_path.exists());
    assert_eq!(manager.status().pid, None);
}

#[test]
fn test_stop_signals_recorded_pid() {
    let temp_dir = TempDir::new().unwrap();
    let pid_path = temp_dir.path().join("daemon.pid");
    fs::write(&pid_path, "7777").unwrap();
    let control = ScriptedControl::new(true, delivered);

    let manager = DaemonManager::with_parts(
        PidFile::with_path(&pid_path),
        &control,
        FixedLauncher(None),
        temp_dir.path().join("daemon.log"),
    );

    assert!(manager.stop().unwrap());
    assert_eq!(*control.signalled.borrow(), vec![7777]);
}

#[test]
fn test_stop_races_with_daemon_exit() {
    let (_temp_dir, pid_path, manager) =
        setup(Some("8888"), ScriptedControl::new(true, not_found), None);

    assert!(!manager.stop().unwrap());
    assert!(!pid_path.exists());
}

#[test]
fn test_stop_without_pid_file() {
    let (_temp_dir, _pid_path, manager) = setup(None, ScriptedControl::new(true, delivered), None);

    assert!(!manager.stop().unwrap());
}

#[test]
fn test_spawn_without_pid_leaves_no_record() {
    let (temp_dir, pid_path, manager) = setup(None, ScriptedControl::new(true, delivered), None);

    let result = manager.spawn_with(&request(temp_dir.path().join("daemon.log")));
    assert!(matches!(result, Err(TetherError::SpawnError(_))));
    assert!(!pid_path.exists());
}

#[test]
fn test_garbage_pid_file_reads_as_no_daemon() {
    let (_temp_dir, pid_path, manager) =
        setup(Some("not-a-pid"), ScriptedControl::new(true, delivered), None);

    assert_eq!(manager.get_pid(), None);
    // Nothing valid was read, so nothing was checked or removed
    assert!(pid_path.exists());
}
