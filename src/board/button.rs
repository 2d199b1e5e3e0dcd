//! Push-button trigger plumbed as an event channel
//!
//! Backends (GPIO drivers, the Enter-key simulation) push press events
//! into a [`Trigger`]; the controller waits on the [`Button`] end.
//! Keeping the two halves separate lets the controller drain presses
//! that arrived while a conversation was active.

use tokio::sync::{mpsc, Mutex};

/// Sending half handed to hardware backends: one event per press.
#[derive(Clone)]
pub struct Trigger {
    tx: mpsc::UnboundedSender<()>,
}

impl Trigger {
    /// Record a press. Silently dropped once the button half is gone.
    pub fn press(&self) {
        let _ = self.tx.send(());
    }
}

/// Receiving half owned by the board.
pub struct Button {
    rx: Mutex<mpsc::UnboundedReceiver<()>>,
}

impl Button {
    /// Create a connected trigger/button pair.
    pub fn channel() -> (Trigger, Button) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Trigger { tx }, Button { rx: Mutex::new(rx) })
    }

    /// Wait for the next press. Returns `None` once every trigger
    /// handle has been dropped, meaning the backend died.
    pub async fn wait_for_press(&self) -> Option<()> {
        self.rx.lock().await.recv().await
    }

    /// Discard presses that queued up while nobody was waiting.
    /// Returns how many were dropped.
    pub async fn clear_pending(&self) -> usize {
        let mut rx = self.rx.lock().await;
        let mut drained = 0;
        while rx.try_recv().is_ok() {
            drained += 1;
        }
        drained
    }
}
