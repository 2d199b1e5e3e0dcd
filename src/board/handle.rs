//! Process-lifetime board resource
//!
//! The board bundles button and indicator access behind one handle.
//! It is claimed exactly once per process and released exactly once,
//! whichever way the process leaves its loop.

use super::button::{Button, Trigger};
use super::led::{Led, LedBackend};
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};

/// Set while a [`Board`] instance is alive.
static CLAIMED: AtomicBool = AtomicBool::new(false);

/// What the controller needs from the board.
///
/// The concrete [`Board`] drives real backends; tests substitute their
/// own implementation.
#[async_trait]
pub trait BoardHandle: Send + Sync {
    /// Wait until the physical trigger fires.
    async fn wait_for_trigger(&self) -> Result<()>;

    /// Drop presses that arrived while a conversation was active.
    /// Returns how many were discarded.
    async fn clear_pending_triggers(&self) -> usize;

    /// Handle to the indicator, shared with action handlers.
    fn led(&self) -> Led;
}

/// The claimed board hardware.
pub struct Board {
    button: Button,
    led: Led,
}

impl Board {
    /// Claim the board for this process.
    ///
    /// Fails if a board is already claimed; the handle releases the
    /// claim on drop. Returns the trigger half so the chosen button
    /// backend can feed presses in.
    pub fn claim(led_backend: Box<dyn LedBackend>) -> Result<(Board, Trigger)> {
        if CLAIMED.swap(true, Ordering::SeqCst) {
            bail!("board is already claimed by this process");
        }
        let (trigger, button) = Button::channel();
        tracing::debug!("board claimed");
        Ok((
            Board {
                button,
                led: Led::new(led_backend),
            },
            trigger,
        ))
    }

    /// Whether a board is currently claimed.
    pub fn is_claimed() -> bool {
        CLAIMED.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BoardHandle for Board {
    async fn wait_for_trigger(&self) -> Result<()> {
        self.button
            .wait_for_press()
            .await
            .ok_or_else(|| anyhow!("button backend terminated"))
    }

    async fn clear_pending_triggers(&self) -> usize {
        self.button.clear_pending().await
    }

    fn led(&self) -> Led {
        self.led.clone()
    }
}

impl Drop for Board {
    fn drop(&mut self) {
        CLAIMED.store(false, Ordering::SeqCst);
        tracing::info!("board released");
    }
}
