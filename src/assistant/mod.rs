//! Conversation service integration
//!
//! This module handles:
//! - The contract every conversation client implements
//! - Per-process assistant settings (volume, language, identity)
//! - A scripted simulation client for development machines

mod client;
mod sim;

pub use client::{AssistantConfig, ConversationClient};
pub use sim::SimClient;
