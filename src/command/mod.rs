//! Device command infrastructure
//!
//! This module handles:
//! - The read-only-after-startup registry of named device actions
//! - Typed parameter schemas parsed from the service's raw strings
//! - The action handlers themselves

pub mod handlers;
pub mod params;
mod registry;

pub use params::{ParamSchema, ParamValues};
pub use registry::{CommandHandler, CommandRegistry, DeviceCommand, HandlerError};
