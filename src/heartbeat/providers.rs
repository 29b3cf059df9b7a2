use super::HeartbeatPayload;
use std::collections::BTreeMap;
use std::time::Instant;

type Provider<T> = Box<dyn Fn() -> T + Send + Sync>;

/// Callbacks supplying the current values for each heartbeat
pub struct StatusProviders {
    version: Provider<String>,
    platform_status: Provider<BTreeMap<String, String>>,
    uptime_seconds: Provider<u64>,
}

impl StatusProviders {
    pub fn new(
        version: impl Fn() -> String + Send + Sync + 'static,
        platform_status: impl Fn() -> BTreeMap<String, String> + Send + Sync + 'static,
        uptime_seconds: impl Fn() -> u64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            version: Box::new(version),
            platform_status: Box::new(platform_status),
            uptime_seconds: Box::new(uptime_seconds),
        }
    }

    /// Providers for the daemon process: crate version, fixed platform
    /// statuses, and uptime measured from `started`
    pub fn for_daemon(platforms: BTreeMap<String, String>, started: Instant) -> Self {
        Self::new(
            || env!("CARGO_PKG_VERSION").to_string(),
            move || platforms.clone(),
            move || started.elapsed().as_secs(),
        )
    }

    /// Build a payload from the current provider values
    pub fn snapshot(&self) -> HeartbeatPayload {
        HeartbeatPayload {
            version: (self.version)(),
            platform_status: (self.platform_status)(),
            uptime_seconds: (self.uptime_seconds)(),
        }
    }
}
