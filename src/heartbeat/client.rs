// HTTP transport for heartbeats

use super::{HeartbeatClient, HeartbeatPayload, HeartbeatResponse};
use crate::config::TetherConfig;
use crate::error::{Result, TetherError};
use async_trait::async_trait;

/// Posts heartbeats as JSON to `{endpoint}/relays/{relay_id}/heartbeat`
pub struct HttpHeartbeatClient {
    http: reqwest::Client,
    endpoint: String,
    api_token: Option<String>,
}

impl HttpHeartbeatClient {
    pub fn from_config(config: &TetherConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.heartbeat.request_timeout())
            .build()
            .map_err(|e| TetherError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    fn heartbeat_url(&self, relay_id: &str) -> String {
        format!("{}/relays/{}/heartbeat", self.endpoint, relay_id)
    }
}

#[async_trait]
impl HeartbeatClient for HttpHeartbeatClient {
    async fn heartbeat(
        &self,
        relay_id: &str,
        payload: HeartbeatPayload,
    ) -> Result<HeartbeatResponse> {
        let mut request = self.http.post(self.heartbeat_url(relay_id)).json(&payload);
        if let Some(ref token) = self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TetherError::HeartbeatError(format!(
                "Status service returned {}",
                status
            )));
        }

        Ok(response.json::<HeartbeatResponse>().await?)
    }
}
