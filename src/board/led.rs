//! LED indicator with exclusive, scoped ownership
//!
//! The indicator is shared hardware: any action handler may ask for
//! it, but exactly one may hold it at a time. Acquisition is fail-fast
//! and the guard restores the indicator to `Off` when it is released,
//! no matter where the holder stopped.

use anyhow::Result;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// RGB color for the indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const RED: Color = Color { r: 255, g: 0, b: 0 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255 };
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// State of the indicator at any instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedState {
    #[default]
    Off,
    On(Color),
}

impl fmt::Display for LedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedState::Off => write!(f, "off"),
            LedState::On(color) => write!(f, "on {}", color),
        }
    }
}

/// The indicator is already held by another handler
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("LED indicator is busy")]
pub struct BusyError;

/// Hardware access for the indicator
///
/// Implemented by platform drivers (out of scope here) and by the
/// logging backend in `board::sim`. `apply` must be cheap and
/// non-blocking: the guard calls it from drop.
pub trait LedBackend: Send + Sync {
    fn apply(&self, state: LedState) -> Result<()>;
}

struct LedHardware {
    backend: Box<dyn LedBackend>,
    state: LedState,
}

/// The indicator resource. Clones share the same underlying hardware.
#[derive(Clone)]
pub struct Led {
    hw: Arc<Mutex<LedHardware>>,
}

impl Led {
    pub fn new(backend: Box<dyn LedBackend>) -> Self {
        Self {
            hw: Arc::new(Mutex::new(LedHardware {
                backend,
                state: LedState::Off,
            })),
        }
    }

    /// Claim exclusive ownership of the indicator.
    ///
    /// Fails fast with [`BusyError`] while another guard is alive.
    /// Indicator actions are short and user-triggered, so queueing a
    /// second request would only replay a stale effect later.
    pub fn try_acquire(&self) -> Result<LedGuard, BusyError> {
        let hw = self.hw.clone().try_lock_owned().map_err(|_| BusyError)?;
        Ok(LedGuard { hw })
    }

    /// Observe the current state without claiming the indicator.
    ///
    /// Returns `None` while a handler holds it.
    pub fn peek_state(&self) -> Option<LedState> {
        self.hw.try_lock().ok().map(|hw| hw.state)
    }
}

/// Exclusive, scoped ownership of the indicator
pub struct LedGuard {
    hw: OwnedMutexGuard<LedHardware>,
}

impl LedGuard {
    /// Light the indicator in the given color.
    pub fn set(&mut self, color: Color) -> Result<()> {
        let state = LedState::On(color);
        self.hw.backend.apply(state)?;
        self.hw.state = state;
        Ok(())
    }

    /// Turn the indicator off.
    pub fn clear(&mut self) -> Result<()> {
        self.hw.backend.apply(LedState::Off)?;
        self.hw.state = LedState::Off;
        Ok(())
    }
}

impl Drop for LedGuard {
    fn drop(&mut self) {
        // A holder that never touched the indicator leaves the
        // hardware untouched; anything else goes back to Off.
        if self.hw.state != LedState::Off {
            if self.hw.backend.apply(LedState::Off).is_err() {
                tracing::warn!("failed to clear indicator on release");
            }
            self.hw.state = LedState::Off;
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingBackend;
    use super::*;

    #[test]
    fn test_second_acquire_fails_fast() {
        let led = Led::new(Box::new(RecordingBackend::new()));

        let guard = led.try_acquire().expect("first acquire");
        assert_eq!(led.try_acquire().err(), Some(BusyError));

        drop(guard);
        assert!(led.try_acquire().is_ok());
    }

    #[test]
    fn test_drop_clears_to_off() {
        let backend = RecordingBackend::new();
        let led = Led::new(Box::new(backend.clone()));

        let mut guard = led.try_acquire().expect("acquire");
        guard.set(Color::RED).expect("set");
        drop(guard);

        assert_eq!(
            backend.states(),
            vec![LedState::On(Color::RED), LedState::Off]
        );
        assert_eq!(led.peek_state(), Some(LedState::Off));
    }

    #[test]
    fn test_untouched_guard_leaves_hardware_alone() {
        let backend = RecordingBackend::new();
        let led = Led::new(Box::new(backend.clone()));

        let guard = led.try_acquire().expect("acquire");
        drop(guard);

        assert!(backend.states().is_empty());
        assert_eq!(led.peek_state(), Some(LedState::Off));
    }

    #[test]
    fn test_peek_state_hidden_while_held() {
        let led = Led::new(Box::new(RecordingBackend::new()));

        let mut guard = led.try_acquire().expect("acquire");
        guard.set(Color::WHITE).expect("set");
        assert_eq!(led.peek_state(), None);

        guard.clear().expect("clear");
        drop(guard);
        assert_eq!(led.peek_state(), Some(LedState::Off));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(LedState::Off.to_string(), "off");
        assert_eq!(LedState::On(Color::BLUE).to_string(), "on #0000ff");
    }
}
