//! HTTP push gateway client.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use coach_core::config::PushConfig;
use coach_core::config::push::mask_secret;
use coach_core::error::{AppError, ErrorKind};
use coach_entity::notification::DeliveryChannel;

use super::{DispatchError, DispatchPayload, Dispatcher};

/// Request body posted to the gateway.
#[derive(Debug, Serialize)]
struct PushRequest<'a> {
    user_identity: &'a str,
    title: &'a str,
    body: &'a str,
    data: &'a serde_json::Value,
}

/// Gateway response body.
#[derive(Debug, Deserialize)]
struct PushResponse {
    #[serde(default)]
    delivered: u32,
}

/// Posts push notifications to a gateway that fans them out to devices.
#[derive(Clone)]
pub struct HttpPushDispatcher {
    client: Client,
    gateway_url: String,
    api_key: Option<String>,
}

impl fmt::Debug for HttpPushDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpPushDispatcher")
            .field("gateway_url", &self.gateway_url)
            .field("api_key", &mask_secret(self.api_key.as_deref()))
            .finish_non_exhaustive()
    }
}

impl HttpPushDispatcher {
    /// Build a dispatcher from configuration.
    pub fn new(config: &PushConfig) -> Result<Self, AppError> {
        if !config.is_configured() {
            return Err(AppError::configuration("push.gateway_url is not set"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Failed to create push HTTP client: {e}"),
                    e,
                )
            })?;

        Ok(Self {
            client,
            gateway_url: config.gateway_url.trim().to_string(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
        })
    }
}

#[async_trait]
impl Dispatcher for HttpPushDispatcher {
    async fn dispatch(
        &self,
        channel: DeliveryChannel,
        user_identity: &str,
        payload: &DispatchPayload,
    ) -> Result<u32, DispatchError> {
        if channel != DeliveryChannel::Push {
            return Err(DispatchError::ChannelNotSupported(channel));
        }

        let body = PushRequest {
            user_identity,
            title: &payload.title,
            body: &payload.body,
            data: &payload.data,
        };

        let mut request = self.client.post(&self.gateway_url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(user = %user_identity, status = status.as_u16(), "Push gateway rejected request");
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
            });
        }

        let parsed: PushResponse = response
            .json()
            .await
            .map_err(|e| DispatchError::InvalidResponse(e.to_string()))?;

        debug!(user = %user_identity, delivered = parsed.delivered, "Push dispatched");
        Ok(parsed.delivered)
    }
}
