//! Device identity resolution
//!
//! The conversation service addresses devices by a registered model id
//! plus a per-device instance id. Registering models is the platform's
//! business; here the pair is read from the local store once, at
//! startup, against the credentials that registered it.

use crate::auth::Credentials;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::debug;

/// Environment variable overriding the default identity path.
pub const IDENTITY_ENV: &str = "ASSISTANT_DEVICE_IDENTITY";

const DEFAULT_IDENTITY_PATH: &str = ".config/assistant-device/identity.json";

/// Identity the service knows this device by
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceIdentity {
    pub device_model_id: String,
    pub device_id: String,
}

/// Resolves the device identity for a set of credentials
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, credentials: &Credentials) -> Result<DeviceIdentity>;
}

/// Reads the identity pair from a JSON file in the local store.
pub struct FileIdentityResolver {
    path: PathBuf,
}

impl FileIdentityResolver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Use the `ASSISTANT_DEVICE_IDENTITY` override when set,
    /// otherwise the default store under the user's home directory.
    pub fn from_env() -> Self {
        let path = std::env::var_os(IDENTITY_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(default_store_path);
        Self { path }
    }
}

fn default_store_path() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_IDENTITY_PATH)
}

impl IdentityResolver for FileIdentityResolver {
    fn resolve(&self, credentials: &Credentials) -> Result<DeviceIdentity> {
        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("reading device identity from {}", self.path.display()))?;
        let identity: DeviceIdentity = serde_json::from_slice(&bytes)
            .with_context(|| format!("parsing identity file {}", self.path.display()))?;
        debug!(
            client_id = %credentials.client_id,
            device_model_id = %identity.device_model_id,
            "device identity resolved from local store"
        );
        Ok(identity)
    }
}
