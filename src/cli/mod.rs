// CLI module - User-facing command-line interface

mod output;

use crate::config::TetherConfig;
use crate::daemon::{runner, DaemonManager, StopOutcome};
use crate::error::{Result, TetherError};
use crate::paths::TetherPaths;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tether - keeps a relay agent online in the background
#[derive(Parser)]
#[command(name = "tether")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Private directory (defaults to $TETHER_HOME or ~/.tether)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the background daemon
    Daemon {
        #[command(subcommand)]
        command: DaemonCommands,
    },
}

#[derive(Subcommand)]
enum DaemonCommands {
    /// Start the daemon in the background
    Start {
        /// Enable debug logging in the daemon
        #[arg(short, long)]
        verbose: bool,
    },
    /// Stop the daemon
    Stop,
    /// Stop the daemon if running, then start it again
    Restart {
        /// Enable debug logging in the daemon
        #[arg(short, long)]
        verbose: bool,
    },
    /// Check daemon status
    Status,
    /// Run the daemon in the foreground
    Run {
        /// Enable debug logging
        #[arg(short, long)]
        verbose: bool,
    },
}

impl Cli {
    /// Run the CLI application
    pub async fn run() -> Result<()> {
        let cli = Cli::parse();
        cli.execute().await
    }

    /// Execute the parsed command
    async fn execute(&self) -> Result<()> {
        let paths = match &self.home {
            Some(home) => TetherPaths::with_home(home),
            None => TetherPaths::resolve(),
        };

        match &self.command {
            Commands::Daemon { command } => match command {
                DaemonCommands::Start { verbose } => start(&paths, *verbose),
                DaemonCommands::Stop => stop(&paths),
                DaemonCommands::Restart { verbose } => {
                    stop(&paths)?;
                    start(&paths, *verbose)
                }
                DaemonCommands::Status => {
                    output::print_status(&DaemonManager::new(&paths).status());
                    Ok(())
                }
                DaemonCommands::Run { verbose } => runner::run(&paths, *verbose).await,
            },
        }
    }
}

fn start(paths: &TetherPaths, verbose: bool) -> Result<()> {
    if runner::is_daemon_process() {
        return Err(TetherError::SpawnError(
            "Already running as the daemon; refusing to spawn another".to_string(),
        ));
    }

    // The daemon would exit right away on a bad config; fail here instead
    let config = TetherConfig::load(&paths.config_file())?;
    config.require_relay_id()?;

    let manager = DaemonManager::new(paths);
    if let Some(pid) = manager.get_pid() {
        return Err(TetherError::DaemonAlreadyRunning(pid));
    }

    paths.ensure_log_dir()?;
    let pid = manager.spawn(verbose)?;

    output::notify(output::Tone::Success, &format!("Daemon started (PID: {})", pid));
    output::notify(
        output::Tone::Info,
        &format!("Logs: {}", paths.log_file().display()),
    );
    Ok(())
}

/// Stop the daemon and wait for it to exit.
///
/// Fails if it is still alive after the stop timeout, which keeps `restart`
/// from launching a second daemon next to it.
fn stop(paths: &TetherPaths) -> Result<()> {
    let timeout = match TetherConfig::load(&paths.config_file()) {
        Ok(config) => config.stop_timeout(),
        Err(e) => {
            output::notify(
                output::Tone::Warning,
                &format!("Using default stop timeout: {}", e),
            );
            TetherConfig::default().stop_timeout()
        }
    };

    let spinner = output::Spinner::start("Stopping daemon...");
    match DaemonManager::new(paths).stop_and_wait(timeout) {
        Ok(StopOutcome::NotRunning) => spinner.finish(true, "Daemon is not running"),
        Ok(StopOutcome::AlreadyExited(pid)) => {
            spinner.finish(true, &format!("Daemon (PID: {}) had already exited", pid))
        }
        Ok(StopOutcome::Stopped(pid)) => {
            spinner.finish(true, &format!("Daemon (PID: {}) stopped", pid))
        }
        Err(e) => {
            spinner.finish(false, "Daemon did not stop");
            return Err(e);
        }
    }
    Ok(())
}
