use super::{HeartbeatClient, StatusProviders};
use crate::config::HeartbeatConfig;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Counters reported when the loop exits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeartbeatStats {
    /// Heartbeats acknowledged by the service
    pub sent: u64,
    /// Heartbeats that failed to send
    pub failed: u64,
    /// Acknowledgements that flagged pending outbound work
    pub pending_outbound: u64,
}

/// Send heartbeats every `config.interval()` until `cancel` fires.
///
/// A failed send is logged and the loop carries on; the next tick is the retry.
/// Cancellation cuts the wait short but never aborts a heartbeat in flight.
pub async fn run_heartbeat_loop<C>(
    client: &C,
    relay_id: &str,
    config: &HeartbeatConfig,
    providers: &StatusProviders,
    cancel: CancellationToken,
) -> HeartbeatStats
where
    C: HeartbeatClient + ?Sized,
{
    let interval = config.interval();
    let mut stats = HeartbeatStats::default();
    let mut consecutive_failures: u64 = 0;

    info!(
        "Starting heartbeat loop for relay {} (interval: {}s)",
        relay_id, config.interval_secs
    );

    while !cancel.is_cancelled() {
        match client.heartbeat(relay_id, providers.snapshot()).await {
            Ok(response) => {
                stats.sent += 1;
                if consecutive_failures > 0 {
                    info!("Heartbeat recovered after {} failure(s)", consecutive_failures);
                    consecutive_failures = 0;
                }
                if response.has_pending_outbound {
                    stats.pending_outbound += 1;
                    debug!("Status service reports pending outbound work");
                }
            }
            Err(e) => {
                stats.failed += 1;
                consecutive_failures += 1;
                warn!(
                    "Heartbeat failed ({} in a row): {}",
                    consecutive_failures, e
                );
            }
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = sleep(interval) => {}
        }
    }

    info!(
        "Heartbeat loop stopped ({} sent, {} failed)",
        stats.sent, stats.failed
    );
    stats
}
