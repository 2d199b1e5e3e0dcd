//! Simulated board backends for development machines
//!
//! Real deployments wire GPIO drivers into [`Board::claim`] and the
//! trigger. On a workstation the Enter key stands in for the button
//! and the indicator becomes a log line; the control flow above stays
//! identical.
//!
//! [`Board::claim`]: super::Board::claim

use super::button::Trigger;
use super::led::{LedBackend, LedState};
use anyhow::Result;
use std::io::BufRead;
use std::thread;
use tracing::{info, warn};

/// Indicator backend that logs state changes instead of driving GPIO.
pub struct LogLed;

impl LedBackend for LogLed {
    fn apply(&self, state: LedState) -> Result<()> {
        info!(%state, "indicator");
        Ok(())
    }
}

/// Feed one press into the trigger for every line read from stdin.
///
/// Stdin reads block, so the pump runs on a dedicated thread rather
/// than a runtime task: a read parked in the runtime's blocking pool
/// would stall runtime shutdown until the next keypress. The thread
/// owns stdin for the process lifetime; it stops when stdin closes,
/// after which the controller's trigger wait reports the backend as
/// gone.
pub fn spawn_enter_key_trigger(trigger: Trigger) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(_) => trigger.press(),
                Err(e) => {
                    warn!("stdin read failed, button simulation stopped: {}", e);
                    return;
                }
            }
        }
        warn!("stdin closed, button simulation stopped");
    })
}
