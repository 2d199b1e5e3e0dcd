//! Command registry and dispatch
//!
//! Maps the names the conversation service sends onto device actions.
//! Registration happens once during startup on an owned registry;
//! afterwards the registry moves behind an `Arc` and is read-only,
//! which is what makes dispatch from any task during a turn sound
//! without locking.

use super::params::{ParamSchema, ParamValues, ParameterError};
use crate::board::BusyError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Registration under a name that is already taken
#[derive(Error, Debug)]
#[error("command '{0}' is already registered")]
pub struct DuplicateCommandError(pub String);

/// Failure produced by a command handler
#[derive(Error, Debug)]
pub enum HandlerError {
    /// The handler could not claim the indicator.
    #[error(transparent)]
    Busy(#[from] BusyError),
    /// Anything else the handler ran into.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure of a single dispatch
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("invalid parameters for '{name}': {source}")]
    Parameter {
        name: String,
        #[source]
        source: ParameterError,
    },
    #[error("command '{name}' rejected: indicator busy")]
    Busy { name: String },
    #[error("command '{name}' failed: {source}")]
    Handler {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

/// A device action behind a registered name.
///
/// Handlers run on whatever task the conversation client dispatches
/// from and receive only schema-validated parameters.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn execute(&self, params: &ParamValues) -> Result<(), HandlerError>;
}

/// One registered device command: wire name, schema, handler.
pub struct DeviceCommand {
    name: String,
    schema: ParamSchema,
    handler: Arc<dyn CommandHandler>,
}

impl DeviceCommand {
    pub fn new(
        name: impl Into<String>,
        schema: ParamSchema,
        handler: Arc<dyn CommandHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            schema,
            handler,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Name-to-handler table for device commands
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, DeviceCommand>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device command.
    ///
    /// Needs `&mut self`, so it is only possible while the registry is
    /// still owned by startup code. A failed registration leaves the
    /// registry unchanged.
    pub fn register(&mut self, command: DeviceCommand) -> Result<(), DuplicateCommandError> {
        if self.commands.contains_key(command.name()) {
            return Err(DuplicateCommandError(command.name().to_owned()));
        }
        info!(command = command.name(), "device command registered");
        self.commands.insert(command.name().to_owned(), command);
        Ok(())
    }

    /// Look up a command by name, validate the raw parameters and run
    /// the handler to completion.
    pub async fn dispatch(&self, name: &str, raw_params: &Value) -> Result<(), DispatchError> {
        info!(command = name, params = %raw_params, "dispatching device command");
        let result = self.dispatch_inner(name, raw_params).await;
        if let Err(e) = &result {
            warn!(command = name, error = %e, "device command failed");
        }
        result
    }

    async fn dispatch_inner(&self, name: &str, raw_params: &Value) -> Result<(), DispatchError> {
        let command = self
            .commands
            .get(name)
            .ok_or_else(|| DispatchError::UnknownCommand(name.to_owned()))?;

        let params = command
            .schema
            .parse(raw_params)
            .map_err(|source| DispatchError::Parameter {
                name: name.to_owned(),
                source,
            })?;

        match command.handler.execute(&params).await {
            Ok(()) => Ok(()),
            Err(HandlerError::Busy(_)) => Err(DispatchError::Busy {
                name: name.to_owned(),
            }),
            Err(HandlerError::Other(source)) => Err(DispatchError::Handler {
                name: name.to_owned(),
                source,
            }),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Registered wire names, for the startup log.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingHandler {
        calls: StdMutex<Vec<ParamValues>>,
    }

    #[async_trait]
    impl CommandHandler for RecordingHandler {
        async fn execute(&self, params: &ParamValues) -> Result<(), HandlerError> {
            self.calls.lock().unwrap().push(params.clone());
            Ok(())
        }
    }

    struct FailingHandler;

    #[async_trait]
    impl CommandHandler for FailingHandler {
        async fn execute(&self, _params: &ParamValues) -> Result<(), HandlerError> {
            Err(HandlerError::Other(anyhow::anyhow!("hardware fault")))
        }
    }

    struct BusyHandler;

    #[async_trait]
    impl CommandHandler for BusyHandler {
        async fn execute(&self, _params: &ParamValues) -> Result<(), HandlerError> {
            Err(HandlerError::Busy(BusyError))
        }
    }

    fn blink_like_schema() -> ParamSchema {
        ParamSchema::new()
            .choice("speed", &["SLOWLY", "NORMALLY", "QUICKLY"])
            .uint("number")
    }

    #[tokio::test]
    async fn test_dispatch_runs_handler_once_with_parsed_params() {
        let handler = Arc::new(RecordingHandler::default());
        let mut registry = CommandRegistry::new();
        registry
            .register(DeviceCommand::new(
                "device.blink",
                blink_like_schema(),
                handler.clone(),
            ))
            .expect("register");

        registry
            .dispatch("device.blink", &json!({"speed": "QUICKLY", "number": "3"}))
            .await
            .expect("dispatch");

        let calls = handler.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].choice("speed").unwrap(), "QUICKLY");
        assert_eq!(calls[0].uint("number").unwrap(), 3);
    }

    #[tokio::test]
    async fn test_unknown_command_rejected() {
        let registry = CommandRegistry::new();
        let err = registry
            .dispatch("device.noop", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::UnknownCommand(ref name) if name == "device.noop"));
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let mut registry = CommandRegistry::new();
        registry
            .register(DeviceCommand::new(
                "device.blink",
                blink_like_schema(),
                Arc::new(RecordingHandler::default()),
            ))
            .expect("first registration");

        let err = registry
            .register(DeviceCommand::new(
                "device.blink",
                ParamSchema::new(),
                Arc::new(RecordingHandler::default()),
            ))
            .unwrap_err();
        assert_eq!(err.0, "device.blink");

        // The original entry is untouched.
        assert!(registry.contains("device.blink"));
        assert_eq!(registry.names(), vec!["device.blink"]);
    }

    #[tokio::test]
    async fn test_invalid_params_never_reach_the_handler() {
        let handler = Arc::new(RecordingHandler::default());
        let mut registry = CommandRegistry::new();
        registry
            .register(DeviceCommand::new(
                "device.blink",
                blink_like_schema(),
                handler.clone(),
            ))
            .expect("register");

        let err = registry
            .dispatch("device.blink", &json!({"speed": "QUICKLY", "number": "-1"}))
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Parameter { ref name, .. } if name == "device.blink"));
        assert!(handler.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_busy_handler_maps_to_busy_dispatch_error() {
        let mut registry = CommandRegistry::new();
        registry
            .register(DeviceCommand::new(
                "device.blink",
                ParamSchema::new(),
                Arc::new(BusyHandler),
            ))
            .expect("register");

        let err = registry.dispatch("device.blink", &json!({})).await.unwrap_err();
        assert!(matches!(err, DispatchError::Busy { ref name } if name == "device.blink"));
    }

    #[tokio::test]
    async fn test_handler_failure_carries_the_command_name() {
        let mut registry = CommandRegistry::new();
        registry
            .register(DeviceCommand::new(
                "device.blink",
                ParamSchema::new(),
                Arc::new(FailingHandler),
            ))
            .expect("register");

        let err = registry.dispatch("device.blink", &json!({})).await.unwrap_err();
        match err {
            DispatchError::Handler { name, source } => {
                assert_eq!(name, "device.blink");
                assert_eq!(source.to_string(), "hardware fault");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_shared_registry_dispatches_from_concurrent_tasks() {
        struct SlowHandler {
            entered: AtomicUsize,
        }

        #[async_trait]
        impl CommandHandler for SlowHandler {
            async fn execute(&self, _params: &ParamValues) -> Result<(), HandlerError> {
                self.entered.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(30)).await;
                Ok(())
            }
        }

        let handler = Arc::new(SlowHandler {
            entered: AtomicUsize::new(0),
        });
        let mut registry = CommandRegistry::new();
        registry
            .register(DeviceCommand::new(
                "device.slow",
                ParamSchema::new(),
                handler.clone(),
            ))
            .expect("register");
        let registry = Arc::new(registry);

        let background = {
            let registry = registry.clone();
            tokio::spawn(async move { registry.dispatch("device.slow", &json!({})).await })
        };
        registry
            .dispatch("device.slow", &json!({}))
            .await
            .expect("foreground dispatch");
        background
            .await
            .expect("join")
            .expect("background dispatch");

        assert_eq!(handler.entered.load(Ordering::SeqCst), 2);
    }
}
