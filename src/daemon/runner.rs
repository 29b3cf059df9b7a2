// Foreground body of the daemon process

use super::launcher::DAEMON_ENV;
use super::manager::DaemonManager;
use crate::config::TetherConfig;
use crate::error::Result;
use crate::heartbeat::{run_heartbeat_loop, HttpHeartbeatClient, StatusProviders};
use crate::paths::TetherPaths;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Whether this process was started by the supervisor as the daemon
pub fn is_daemon_process() -> bool {
    std::env::var_os(DAEMON_ENV).is_some()
}

/// Run the daemon in the foreground until SIGTERM or SIGINT
pub async fn run(paths: &TetherPaths, verbose: bool) -> Result<()> {
    init_tracing(verbose);

    // Handlers go in before the PID is recorded, so a SIGTERM from `stop`
    // always reaches the cancellation path
    let cancel = CancellationToken::new();
    install_signal_handlers(cancel.clone())?;

    let manager = DaemonManager::new(paths);
    let pid = std::process::id();

    // When launched by the supervisor the record was already written by the parent
    if !is_daemon_process() {
        manager.register(pid)?;
    }

    let result = serve(paths, pid, cancel).await;
    if let Err(ref e) = result {
        error!("Daemon failed: {}", e);
    }

    manager.release(pid);
    info!("Daemon stopped");
    result
}

async fn serve(paths: &TetherPaths, pid: u32, cancel: CancellationToken) -> Result<()> {
    let config = TetherConfig::load(&paths.config_file())?;
    let relay_id = config.require_relay_id()?;
    let client = HttpHeartbeatClient::from_config(&config)?;

    info!(
        "Daemon started (PID: {}, relay: {}, home: {})",
        pid,
        relay_id,
        paths.private_dir().display()
    );

    let providers = StatusProviders::for_daemon(config.platforms.clone(), Instant::now());
    let stats = run_heartbeat_loop(&client, relay_id, &config.heartbeat, &providers, cancel).await;
    info!(
        "Heartbeats: {} sent, {} failed, {} with pending outbound",
        stats.sent, stats.failed, stats.pending_outbound
    );

    Ok(())
}

/// Cancel `cancel` on the first SIGTERM or SIGINT
#[cfg(unix)]
fn install_signal_handlers(cancel: CancellationToken) -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM"),
            _ = sigint.recv() => info!("Received SIGINT"),
        }
        cancel.cancel();
    });
    Ok(())
}

#[cfg(not(unix))]
fn install_signal_handlers(cancel: CancellationToken) -> Result<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl-C");
                cancel.cancel();
            }
            Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
        }
    });
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (e.g. in tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
