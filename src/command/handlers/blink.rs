//! Blink action: toggle the indicator a requested number of times

use crate::board::{Color, Led};
use crate::command::params::{ParamSchema, ParamValues};
use crate::command::registry::{CommandHandler, DeviceCommand, HandlerError};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;

/// Wire name the conversation service uses for this action.
pub const BLINK_COMMAND_NAME: &str = "com.example.commands.BlinkLight";

const SPEED_KEYWORDS: &[&str] = &["SLOWLY", "NORMALLY", "QUICKLY"];

/// Blink cadence requested by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkSpeed {
    Slowly,
    Normally,
    Quickly,
}

impl BlinkSpeed {
    fn from_keyword(keyword: &str) -> Result<Self> {
        match keyword {
            "SLOWLY" => Ok(BlinkSpeed::Slowly),
            "NORMALLY" => Ok(BlinkSpeed::Normally),
            "QUICKLY" => Ok(BlinkSpeed::Quickly),
            other => anyhow::bail!("unknown blink speed keyword '{}'", other),
        }
    }

    /// Delay between indicator toggles.
    pub fn delay(self) -> Duration {
        match self {
            BlinkSpeed::Slowly => Duration::from_millis(1000),
            BlinkSpeed::Normally => Duration::from_millis(500),
            BlinkSpeed::Quickly => Duration::from_millis(200),
        }
    }
}

/// Blinks the indicator: `speed` keyword plus `number` repetitions.
pub struct BlinkCommand {
    led: Led,
    color: Color,
}

impl BlinkCommand {
    pub fn new(led: Led) -> Self {
        Self {
            led,
            color: Color::BLUE,
        }
    }

    fn schema() -> ParamSchema {
        ParamSchema::new()
            .choice("speed", SPEED_KEYWORDS)
            .uint("number")
    }

    /// Registry entry for this action under its wire name.
    pub fn into_command(self) -> DeviceCommand {
        DeviceCommand::new(BLINK_COMMAND_NAME, Self::schema(), Arc::new(self))
    }
}

#[async_trait]
impl CommandHandler for BlinkCommand {
    async fn execute(&self, params: &ParamValues) -> Result<(), HandlerError> {
        let speed = BlinkSpeed::from_keyword(params.choice("speed")?)?;
        let number = params.uint("number")?;
        let delay = speed.delay();

        info!(times = number, ?speed, "blinking indicator");

        // Held for the whole action; drop puts the indicator back Off.
        let mut indicator = self.led.try_acquire()?;
        for _ in 0..number {
            indicator.set(self.color)?;
            sleep(delay).await;
            indicator.clear()?;
            sleep(delay).await;
        }
        Ok(())
    }
}
