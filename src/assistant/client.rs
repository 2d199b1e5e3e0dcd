//! Conversation service contract
//!
//! The remote service's wire protocol and audio pipeline live outside
//! this crate. The controller only needs one blocking call per turn;
//! implementations receive the command registry at construction and
//! may dispatch device actions while an exchange is in flight.

use anyhow::Result;
use async_trait::async_trait;

/// Settings every conversation client is constructed with
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Playback volume percentage, 0 to 100.
    pub volume: u8,
    /// BCP-47 language code for the exchange.
    pub language: String,
    /// Registered device model identifier.
    pub device_model_id: String,
    /// This device instance's identifier.
    pub device_id: String,
}

/// One voice exchange at a time against the remote service
#[async_trait]
pub trait ConversationClient: Send + Sync {
    /// Run one complete exchange, returning when it naturally ends.
    ///
    /// Network and auth failures surface here and are not retried.
    async fn start_turn(&self) -> Result<()>;
}
