mod assistant;
mod auth;
mod board;
mod cli;
mod command;
mod controller;
mod identity;
mod shutdown;

use assistant::{AssistantConfig, ConversationClient, SimClient};
use auth::{CredentialProvider, FileCredentialProvider};
use board::{sim, Board, BoardHandle};
use cli::Args;
use command::handlers::BlinkCommand;
use command::CommandRegistry;
use controller::ConversationController;
use identity::{FileIdentityResolver, IdentityResolver};
use shutdown::ShutdownCause;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = Args::parse();
    info!(language = %args.language, volume = args.volume, "assistant device starting");

    // Signal handlers first: shutdown must interrupt every later wait.
    let mut shutdown = shutdown::install();

    let credentials = FileCredentialProvider::from_env()
        .credentials()
        .context("credential store unavailable")?;
    let identity = FileIdentityResolver::from_env()
        .resolve(&credentials)
        .context("device identity unresolved")?;
    info!(
        device_model_id = %identity.device_model_id,
        device_id = %identity.device_id,
        "device identity resolved"
    );

    // Board for the process lifetime. The Enter key stands in for the
    // button and the indicator logs until real drivers are wired in.
    let (board, trigger) = Board::claim(Box::new(sim::LogLed)).context("board unavailable")?;
    let _stdin_pump = sim::spawn_enter_key_trigger(trigger);
    let board: Arc<dyn BoardHandle> = Arc::new(board);

    // Every device action registers before the loop starts; from here
    // on the registry is read-only.
    let mut registry = CommandRegistry::new();
    registry.register(BlinkCommand::new(board.led()).into_command())?;
    let registry = Arc::new(registry);
    info!(commands = ?registry.names(), "device commands registered");

    let config = AssistantConfig {
        volume: args.volume,
        language: args.language.clone(),
        device_model_id: identity.device_model_id.clone(),
        device_id: identity.device_id.clone(),
    };
    let client: Arc<dyn ConversationClient> = Arc::new(SimClient::new(config, registry));

    let mut controller = ConversationController::new(board, client);
    controller.run(&mut shutdown).await?;

    if shutdown.cause() == Some(ShutdownCause::Interrupt) {
        println!("Bye");
    }
    Ok(())
}
