//! Board hardware access
//!
//! This module handles:
//! - Process-lifetime claim and release of the board
//! - The push-button trigger as an awaitable event source
//! - Exclusive, scoped ownership of the LED indicator
//! - Simulated backends for development machines

mod button;
mod handle;
mod led;
pub mod sim;

pub use button::{Button, Trigger};
pub use handle::{Board, BoardHandle};
pub use led::{BusyError, Color, Led, LedState};

#[cfg(test)]
pub(crate) use led::testing;
