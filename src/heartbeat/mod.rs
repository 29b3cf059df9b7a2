// Heartbeat module - Periodic liveness reports to the status service

mod client;
mod providers;
mod ticker;

pub use client::HttpHeartbeatClient;
pub use providers::StatusProviders;
pub use ticker::{run_heartbeat_loop, HeartbeatStats};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Snapshot sent with each heartbeat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatPayload {
    pub version: String,
    pub platform_status: BTreeMap<String, String>,
    pub uptime_seconds: u64,
}

/// Reply from the status service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatResponse {
    #[serde(default)]
    pub has_pending_outbound: bool,
}

/// Transport for heartbeats. Timeouts and authentication belong to the implementation.
#[async_trait]
pub trait HeartbeatClient: Send + Sync {
    async fn heartbeat(&self, relay_id: &str, payload: HeartbeatPayload)
        -> Result<HeartbeatResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_uses_camel_case() {
        let payload = HeartbeatPayload {
            version: "0.1.0".to_string(),
            platform_status: BTreeMap::from([("slack".to_string(), "connected".to_string())]),
            uptime_seconds: 42,
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["version"], "0.1.0");
        assert_eq!(json["platformStatus"]["slack"], "connected");
        assert_eq!(json["uptimeSeconds"], 42);
    }

    #[test]
    fn test_response_missing_flag_defaults_false() {
        let response: HeartbeatResponse = serde_json::from_str("{}").unwrap();
        assert!(!response.has_pending_outbound);

        let response: HeartbeatResponse =
            serde_json::from_str(r#"{"hasPendingOutbound":true}"#).unwrap();
        assert!(response.has_pending_outbound);
    }
}
