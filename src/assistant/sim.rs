//! Scripted conversation client for development machines
//!
//! Stands in for the remote service on a workstation. Each turn plays
//! a fixed script: pause as if the user spoke, dispatch the scripted
//! device commands, pause again for the spoken reply.

use super::client::{AssistantConfig, ConversationClient};
use crate::command::handlers::BLINK_COMMAND_NAME;
use crate::command::CommandRegistry;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;

/// One dispatch the simulated exchange performs mid-turn.
#[derive(Debug, Clone)]
pub struct ScriptedDispatch {
    pub command: String,
    pub params: serde_json::Value,
}

/// Conversation client that replays a fixed script per turn.
pub struct SimClient {
    config: AssistantConfig,
    registry: Arc<CommandRegistry>,
    script: Vec<ScriptedDispatch>,
    listen_for: Duration,
    reply_for: Duration,
}

impl SimClient {
    /// Default script: one normal-speed double blink, the service's
    /// usual acknowledgement.
    pub fn new(config: AssistantConfig, registry: Arc<CommandRegistry>) -> Self {
        let script = vec![ScriptedDispatch {
            command: BLINK_COMMAND_NAME.to_owned(),
            params: json!({"speed": "NORMALLY", "number": "2"}),
        }];
        Self {
            config,
            registry,
            script,
            listen_for: Duration::from_millis(700),
            reply_for: Duration::from_millis(300),
        }
    }

    pub fn with_script(mut self, script: Vec<ScriptedDispatch>) -> Self {
        self.script = script;
        self
    }

    #[cfg(test)]
    fn without_pauses(mut self) -> Self {
        self.listen_for = Duration::ZERO;
        self.reply_for = Duration::ZERO;
        self
    }
}

#[async_trait]
impl ConversationClient for SimClient {
    async fn start_turn(&self) -> Result<()> {
        info!(
            language = %self.config.language,
            volume = self.config.volume,
            device_model_id = %self.config.device_model_id,
            device_id = %self.config.device_id,
            "simulated exchange started, listening"
        );
        sleep(self.listen_for).await;

        for step in &self.script {
            // Failures are logged by the registry and never end the
            // exchange, same as with the real service.
            let _ = self.registry.dispatch(&step.command, &step.params).await;
        }

        sleep(self.reply_for).await;
        info!("simulated exchange finished");
        Ok(())
    }
}
