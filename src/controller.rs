//! Conversation lifecycle controller
//!
//! Owns the main loop: wait for the button, run one exchange, repeat.
//! Turns are strictly sequential; the explicit state machine keeps the
//! single-active-turn rule checkable instead of accidental.

use crate::assistant::ConversationClient;
use crate::board::BoardHandle;
use crate::shutdown::Shutdown;
use anyhow::{Context, Result};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Lifecycle states of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Constructed, loop not entered yet.
    Idle,
    /// Blocked on the physical trigger.
    WaitingForTrigger,
    /// One exchange in flight.
    ActiveTurn,
}

/// Events that move the controller between states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnEvent {
    LoopEntered,
    TriggerFired,
    TurnFinished,
}

/// Rejected state transition
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid controller transition: {event:?} while {state:?}")]
pub struct InvalidTransition {
    pub state: TurnState,
    pub event: TurnEvent,
}

/// Tracks the controller's position in the turn lifecycle.
#[derive(Debug)]
pub struct TurnStateMachine {
    state: TurnState,
}

impl TurnStateMachine {
    pub fn new() -> Self {
        Self {
            state: TurnState::Idle,
        }
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    /// Apply an event, returning the new state.
    pub fn apply(&mut self, event: TurnEvent) -> Result<TurnState, InvalidTransition> {
        use TurnEvent::*;
        use TurnState::*;

        let next = match (self.state, event) {
            (Idle, LoopEntered) => WaitingForTrigger,
            (WaitingForTrigger, TriggerFired) => ActiveTurn,
            (ActiveTurn, TurnFinished) => WaitingForTrigger,
            // Triggers seen mid-turn are drained by the loop and never
            // applied here; anything else reaching this arm is a bug.
            (state, event) => return Err(InvalidTransition { state, event }),
        };
        self.state = next;
        Ok(next)
    }
}

impl Default for TurnStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// One exchange, alive from trigger to completion.
struct Turn {
    ordinal: u64,
}

/// Drives the trigger-wait / exchange cycle until shutdown.
pub struct ConversationController {
    board: Arc<dyn BoardHandle>,
    client: Arc<dyn ConversationClient>,
    fsm: TurnStateMachine,
    turns_completed: u64,
}

impl ConversationController {
    pub fn new(board: Arc<dyn BoardHandle>, client: Arc<dyn ConversationClient>) -> Self {
        Self {
            board,
            client,
            fsm: TurnStateMachine::new(),
            turns_completed: 0,
        }
    }

    pub fn state(&self) -> TurnState {
        self.fsm.state()
    }

    pub fn turns_completed(&self) -> u64 {
        self.turns_completed
    }

    /// Run the loop until shutdown is requested.
    ///
    /// A failure of the remote service surfaces as an error, there is
    /// no retry at this level. Dispatch failures inside a turn never
    /// reach this level at all.
    pub async fn run(&mut self, shutdown: &mut Shutdown) -> Result<()> {
        self.fsm.apply(TurnEvent::LoopEntered)?;

        loop {
            info!("press the button to start a conversation");
            tokio::select! {
                _ = shutdown.recv() => break,
                pressed = self.board.wait_for_trigger() => {
                    pressed.context("trigger wait failed")?;
                }
            }

            self.fsm.apply(TurnEvent::TriggerFired)?;
            let turn = Turn {
                ordinal: self.turns_completed + 1,
            };
            info!(turn = turn.ordinal, "conversation started");

            let outcome = tokio::select! {
                _ = shutdown.recv() => None,
                result = self.client.start_turn() => Some(result),
            };
            let Some(result) = outcome else {
                // Shutdown interrupted the exchange; dropping the turn
                // future released whatever the handlers held.
                info!(turn = turn.ordinal, "conversation interrupted by shutdown");
                break;
            };
            result.context("conversation turn failed")?;

            self.fsm.apply(TurnEvent::TurnFinished)?;
            self.turns_completed += 1;
            info!(turn = turn.ordinal, "conversation finished");

            // Presses that landed during the exchange are stale; one
            // press starts at most one turn.
            let ignored = self.board.clear_pending_triggers().await;
            if ignored > 0 {
                debug!(ignored, "discarded triggers that fired mid-turn");
            }
        }

        info!(
            turns_completed = self.turns_completed,
            "conversation loop stopped"
        );
        Ok(())
    }
}
