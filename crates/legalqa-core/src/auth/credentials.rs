//! Durable single-slot storage for the bearer token.
//!
//! Only `SessionManager` talks to a `CredentialStore`; everything else asks
//! the manager for the current identity or bearer.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::Token;

/// Keychain service name
const SERVICE_NAME: &str = "legalqa";

/// Fixed key the token is stored under
pub const TOKEN_KEY: &str = "token";

/// Token file name in the data directory
const TOKEN_FILE: &str = "token.json";

/// One token slot. Last write wins; all calls are synchronous.
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Result<Option<Token>>;
    fn set(&self, token: &Token) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

// ============================================================================
// OS keychain
// ============================================================================

/// Stores the token in the OS keychain
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    pub fn with_service(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(&self.service, TOKEN_KEY).context("Failed to create keyring entry")
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeyringStore {
    fn get(&self) -> Result<Option<Token>> {
        match self.entry()?.get_password() {
            Ok(secret) => Ok(Some(Token::new(secret))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve token from keychain"),
        }
    }

    fn set(&self, token: &Token) -> Result<()> {
        self.entry()?
            .set_password(token.as_str())
            .context("Failed to store token in keychain")
    }

    fn clear(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}

// ============================================================================
// JSON file
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct TokenFile {
    token: Token,
    saved_at: DateTime<Utc>,
}

/// Stores the token in `token.json` under a data directory
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }
}

impl CredentialStore for FileStore {
    fn get(&self) -> Result<Option<Token>> {
        let path = self.token_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path).context("Failed to read token file")?;
        let file: TokenFile =
            serde_json::from_str(&contents).context("Failed to parse token file")?;
        debug!(saved_at = %file.saved_at, "Token file loaded");
        Ok(Some(file.token))
    }

    fn set(&self, token: &Token) -> Result<()> {
        std::fs::create_dir_all(&self.dir).context("Failed to create data directory")?;
        let contents = serde_json::to_string_pretty(&TokenFile {
            token: token.clone(),
            saved_at: Utc::now(),
        })?;
        std::fs::write(self.token_path(), contents).context("Failed to write token file")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let path = self.token_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove token file")?;
        }
        Ok(())
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Non-durable store for tests and `--ephemeral` runs
#[derive(Default)]
pub struct MemoryStore {
    slot: Mutex<Option<Token>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: Token) -> Self {
        Self {
            slot: Mutex::new(Some(token)),
        }
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self) -> Result<Option<Token>> {
        Ok(self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn set(&self, token: &Token) -> Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("nested"));

        assert_eq!(store.get().expect("get"), None);

        store.set(&Token::new("first")).expect("set");
        store.set(&Token::new("second")).expect("set");
        assert_eq!(store.get().expect("get"), Some(Token::new("second")));

        // Survives a fresh handle on the same directory
        let reopened = FileStore::new(dir.path().join("nested"));
        assert_eq!(reopened.get().expect("get"), Some(Token::new("second")));

        store.clear().expect("clear");
        assert_eq!(reopened.get().expect("get"), None);
        // Clearing an empty slot is fine
        store.clear().expect("clear again");
    }

    #[test]
    fn test_file_store_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(TOKEN_FILE), "not json").expect("write");
        let store = FileStore::new(dir.path().to_path_buf());
        assert!(store.get().is_err());
    }

    #[test]
    fn test_memory_store_last_write_wins() {
        let store = MemoryStore::with_token(Token::new("a"));
        store.set(&Token::new("b")).expect("set");
        assert_eq!(store.get().expect("get"), Some(Token::new("b")));
        store.clear().expect("clear");
        assert_eq!(store.get().expect("get"), None);
    }
}
