//! Credential loading for the conversation service
//!
//! Acquiring real credentials (the OAuth consent dance, token
//! refresh) is the platform's business. The device only loads what
//! the local store already holds and fails fast when it is missing,
//! before any hardware is claimed.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable overriding the default credentials path.
pub const CREDENTIALS_ENV: &str = "ASSISTANT_CREDENTIALS";

const DEFAULT_CREDENTIALS_PATH: &str = ".config/assistant-device/credentials.json";

/// OAuth client material for the conversation service
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    // Read by the real service client's token exchange, not here.
    #[allow(dead_code)]
    pub client_secret: SecretString,
    #[allow(dead_code)]
    pub refresh_token: SecretString,
}

/// Source of stored credentials
pub trait CredentialProvider: Send + Sync {
    /// Load credentials; a missing or malformed store is fatal.
    fn credentials(&self) -> Result<Credentials>;
}

/// Loads credentials from a JSON file in the local store.
pub struct FileCredentialProvider {
    path: PathBuf,
}

impl FileCredentialProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Use the `ASSISTANT_CREDENTIALS` override when set, otherwise
    /// the default store under the user's home directory.
    pub fn from_env() -> Self {
        let path = std::env::var_os(CREDENTIALS_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(default_store_path);
        Self { path }
    }
}

fn default_store_path() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_CREDENTIALS_PATH)
}

impl CredentialProvider for FileCredentialProvider {
    fn credentials(&self) -> Result<Credentials> {
        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("reading credentials from {}", self.path.display()))?;
        let credentials: Credentials = serde_json::from_slice(&bytes)
            .with_context(|| format!("parsing credentials file {}", self.path.display()))?;
        Ok(credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_store(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("credentials.json");
        let mut file = std::fs::File::create(&path).expect("create store");
        file.write_all(contents.as_bytes()).expect("write store");
        path
    }

    #[test]
    fn test_loads_credentials_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_store(
            &dir,
            r#"{
                "client_id": "device-client",
                "client_secret": "hunter2",
                "refresh_token": "refresh-abc"
            }"#,
        );

        let credentials = FileCredentialProvider::new(path)
            .credentials()
            .expect("load");
        assert_eq!(credentials.client_id, "device-client");
    }

    #[test]
    fn test_debug_output_redacts_secrets() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_store(
            &dir,
            r#"{"client_id": "id", "client_secret": "hunter2", "refresh_token": "tok"}"#,
        );

        let credentials = FileCredentialProvider::new(path)
            .credentials()
            .expect("load");
        let rendered = format!("{:?}", credentials);
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("tok\""));
    }

    #[test]
    fn test_missing_store_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = FileCredentialProvider::new(dir.path().join("nope.json"))
            .credentials()
            .unwrap_err();
        assert!(err.to_string().contains("reading credentials"));
    }

    #[test]
    fn test_malformed_store_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_store(&dir, "{\"client_id\": 42}");

        let err = FileCredentialProvider::new(path).credentials().unwrap_err();
        assert!(err.to_string().contains("parsing credentials"));
    }
}
