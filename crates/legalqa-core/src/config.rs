//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the backend URL, the last used username and where the
//! session token is kept.
//!
//! Configuration is stored at `~/.config/legalqa/config.json`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_API_URL;
use crate::auth::{CredentialStore, FileStore, KeyringStore};

/// Application name used for config/data directory paths
const APP_NAME: &str = "legalqa";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable that overrides the configured backend URL
pub const API_URL_ENV: &str = "LEGALQA_API_URL";

/// Where the session token is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    Keyring,
    #[default]
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api_url: Option<String>,
    pub last_username: Option<String>,
    pub credential_backend: CredentialBackend,
    /// Also write logs to daily files in this directory
    pub log_dir: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Backend URL: environment, then config file, then the local default
    pub fn api_url(&self) -> String {
        resolve_api_url(std::env::var(API_URL_ENV).ok(), self.api_url.as_deref())
    }

    /// Open the configured durable token store
    pub fn credential_store(&self) -> Result<Arc<dyn CredentialStore>> {
        Ok(match self.credential_backend {
            CredentialBackend::Keyring => Arc::new(KeyringStore::new()),
            CredentialBackend::File => Arc::new(FileStore::new(self.data_dir()?)),
        })
    }
}

fn resolve_api_url(from_env: Option<String>, configured: Option<&str>) -> String {
    from_env
        .filter(|url| !url.trim().is_empty())
        .or_else(|| configured.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"last_username": "alice"}"#).expect("Failed to parse config");
        assert_eq!(config.last_username.as_deref(), Some("alice"));
        assert_eq!(config.credential_backend, CredentialBackend::File);
        assert!(config.api_url.is_none());
    }

    #[test]
    fn test_credential_backend_serialization() {
        let config: Config = serde_json::from_str(r#"{"credential_backend": "keyring"}"#)
            .expect("Failed to parse config");
        assert_eq!(config.credential_backend, CredentialBackend::Keyring);
    }

    #[test]
    fn test_api_url_precedence() {
        assert_eq!(
            resolve_api_url(Some("https://env.example".to_string()), Some("https://cfg.example")),
            "https://env.example"
        );
        assert_eq!(
            resolve_api_url(Some("  ".to_string()), Some("https://cfg.example")),
            "https://cfg.example"
        );
        assert_eq!(resolve_api_url(None, None), DEFAULT_API_URL);
    }
}
