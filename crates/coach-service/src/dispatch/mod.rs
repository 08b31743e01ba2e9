//! Outbound delivery.
//!
//! The coordinator talks to transports only through [`Dispatcher`]. A
//! dispatcher reports how many devices it reached; zero is treated as a
//! failed delivery by the caller.

pub mod push;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use coach_entity::notification::{DeliveryChannel, NotificationRecord};

pub use push::HttpPushDispatcher;

/// What is delivered to the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchPayload {
    pub title: String,
    pub body: String,
    /// Opaque producer payload (JSON object).
    pub data: serde_json::Value,
}

impl DispatchPayload {
    pub fn from_record(record: &NotificationRecord) -> Self {
        Self {
            title: record.title.clone(),
            body: record.body.clone(),
            data: record.data.clone(),
        }
    }
}

/// Why a dispatch did not happen.
///
/// `Display` is the `failure_reason` stored on the ledger record.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// No transport is wired for this channel.
    #[error("channel_not_supported")]
    ChannelNotSupported(DeliveryChannel),

    /// The gateway answered with a non-success status.
    #[error("gateway_rejected: HTTP {status}")]
    Rejected { status: u16 },

    /// The request never completed.
    #[error("transport_error: {0}")]
    Transport(String),

    /// The gateway answered with something unreadable.
    #[error("invalid_gateway_response: {0}")]
    InvalidResponse(String),

    /// No gateway is configured.
    #[error("dispatcher_not_configured")]
    NotConfigured,
}

/// Channel-specific sender.
#[async_trait]
pub trait Dispatcher: Send + Sync + std::fmt::Debug + 'static {
    /// Deliver `payload` to every device of `user_identity` on `channel` and
    /// return the number of devices reached.
    async fn dispatch(
        &self,
        channel: DeliveryChannel,
        user_identity: &str,
        payload: &DispatchPayload,
    ) -> Result<u32, DispatchError>;
}

/// Dispatcher used when no push gateway is configured. Logs the payload and
/// reports that nothing was delivered.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDispatcher;

#[async_trait]
impl Dispatcher for NullDispatcher {
    async fn dispatch(
        &self,
        channel: DeliveryChannel,
        user_identity: &str,
        payload: &DispatchPayload,
    ) -> Result<u32, DispatchError> {
        info!(
            channel = %channel,
            user = %user_identity,
            title = %payload.title,
            "No push gateway configured, dropping notification"
        );
        Err(DispatchError::NotConfigured)
    }
}
