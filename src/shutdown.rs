//! Graceful shutdown signaling
//!
//! One watcher task turns process signals into a broadcast cause that
//! every blocking wait can `select!` against. The cause survives until
//! exit so `main` can pick the right farewell.

use tokio::sync::watch;
use tracing::info;

/// Why the process is leaving its loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownCause {
    /// Ctrl-C at an interactive terminal.
    Interrupt,
    /// Service-manager style termination (SIGTERM).
    Terminate,
}

/// Receiving side handed to blocking loops.
#[derive(Clone)]
pub struct Shutdown {
    rx: watch::Receiver<Option<ShutdownCause>>,
}

impl Shutdown {
    /// Wait until shutdown is requested.
    pub async fn recv(&mut self) -> ShutdownCause {
        loop {
            if let Some(cause) = *self.rx.borrow() {
                return cause;
            }
            if self.rx.changed().await.is_err() {
                // Notifier gone without a cause; treat as termination.
                return ShutdownCause::Terminate;
            }
        }
    }

    /// The recorded cause, if shutdown has been requested.
    pub fn cause(&self) -> Option<ShutdownCause> {
        *self.rx.borrow()
    }
}

/// Sending side kept by the signal watcher (and by tests).
pub struct ShutdownNotifier {
    tx: watch::Sender<Option<ShutdownCause>>,
}

impl ShutdownNotifier {
    /// Record the cause and wake everything waiting in `recv`.
    /// The first cause wins if two signals race.
    pub fn notify(&self, cause: ShutdownCause) {
        self.tx.send_if_modified(|current| {
            if current.is_none() {
                *current = Some(cause);
                true
            } else {
                false
            }
        });
    }
}

/// Create a connected notifier/receiver pair.
pub fn channel() -> (ShutdownNotifier, Shutdown) {
    let (tx, rx) = watch::channel(None);
    (ShutdownNotifier { tx }, Shutdown { rx })
}

/// Arm the process signal handlers and return the receiving side.
///
/// SIGTERM and Ctrl-C both stop the loops; they differ only in the
/// recorded cause. The handlers are registered before this returns,
/// so a signal delivered at any point afterwards is caught. A
/// registration failure panics here, on the caller's stack.
pub fn install() -> Shutdown {
    let (notifier, shutdown) = channel();
    spawn_signal_watcher(notifier);
    shutdown
}

#[cfg(unix)]
fn spawn_signal_watcher(notifier: ShutdownNotifier) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt =
        signal(SignalKind::interrupt()).expect("failed to install Ctrl+C handler");
    let mut terminate =
        signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

    tokio::spawn(async move {
        let cause = tokio::select! {
            _ = interrupt.recv() => ShutdownCause::Interrupt,
            _ = terminate.recv() => ShutdownCause::Terminate,
        };
        info!(?cause, "shutdown signal received");
        notifier.notify(cause);
    });
}

#[cfg(not(unix))]
fn spawn_signal_watcher(notifier: ShutdownNotifier) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!(cause = ?ShutdownCause::Interrupt, "shutdown signal received");
                notifier.notify(ShutdownCause::Interrupt);
            }
            Err(error) => tracing::error!(%error, "Ctrl+C handler unavailable"),
        }
    });
}
