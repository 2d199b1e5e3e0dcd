//! Device action handlers
//!
//! Each handler turns validated parameters into physical side effects.
//! Handlers claim the indicator for as long as they run; the registry
//! itself stays hardware-free.

mod blink;

pub use blink::{BlinkCommand, BLINK_COMMAND_NAME};
