//! Credential persistence backends.
//!
//! The store is injected into the session manager so the same client code
//! runs against an in-memory store (tests, short-lived hosts) or the file
//! store (the CLI). The file store keeps the session as JSON under the
//! platform config directory and mirrors the refresh token to the system
//! keyring when one is available, with the file as plaintext fallback.

use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::credentials::CredentialPair;
use crate::error::StoreError;

/// Storage format version (for future migrations)
const STORE_VERSION: u32 = 1;

/// Service name for system keyring entries
const KEYRING_SERVICE: &str = "jobgrid";

/// Keyring entry holding the refresh token
const KEYRING_USER: &str = "refresh-token";

/// A place to keep the current credential pair.
///
/// `set` replaces both tokens together; `get` never observes a half-updated
/// pair.
pub trait CredentialStore: Send + Sync {
    /// The stored pair, if a session exists.
    fn get(&self) -> Result<Option<CredentialPair>, StoreError>;

    /// Replace the stored pair.
    fn set(&self, pair: &CredentialPair) -> Result<(), StoreError>;

    /// Remove all stored credentials.
    fn clear(&self) -> Result<(), StoreError>;
}

/// Process-local store. Nothing survives the process; useful for tests and
/// hosts without persistent storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Option<CredentialPair>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self) -> Result<Option<CredentialPair>, StoreError> {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone())
    }

    fn set(&self, pair: &CredentialPair) -> Result<(), StoreError> {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(pair.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        *guard = None;
        Ok(())
    }
}

/// On-disk layout of a stored session.
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    /// Version for schema migrations
    version: u32,
    access_token: String,
    refresh_token: String,
}

/// File-backed store under the platform config directory.
///
/// - Linux: `~/.config/jobgrid/session.json`
/// - macOS: `~/Library/Application Support/jobgrid/session.json`
/// - Windows: `%APPDATA%\jobgrid\session.json`
pub struct FileStore {
    path: PathBuf,
    keyring_available: bool,
}

impl FileStore {
    pub fn new() -> Result<Self, StoreError> {
        let config_dir = directories::ProjectDirs::from("com", "jobgrid", "jobgrid")
            .ok_or(StoreError::NoConfigDir)?
            .config_dir()
            .to_path_buf();
        std::fs::create_dir_all(&config_dir)?;

        let keyring_available = Self::check_keyring_available();
        if keyring_available {
            debug!("system keyring available for refresh token storage");
        } else {
            warn!("system keyring not available; refresh token will be stored in plaintext");
        }

        Ok(Self {
            path: config_dir.join("session.json"),
            keyring_available,
        })
    }

    /// Checks if the system keyring is functional
    fn check_keyring_available() -> bool {
        keyring::Entry::new(KEYRING_SERVICE, "test-availability").is_ok()
    }

    /// Path of the session file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn keyring_get(&self) -> Option<String> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER).ok()?;
        entry.get_password().ok()
    }

    fn keyring_set(&self, refresh_token: &str) -> Result<(), StoreError> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)
            .map_err(|e| StoreError::Keyring(e.to_string()))?;
        entry
            .set_password(refresh_token)
            .map_err(|e| StoreError::Keyring(e.to_string()))
    }

    fn keyring_remove(&self) -> Result<(), StoreError> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)
            .map_err(|e| StoreError::Keyring(e.to_string()))?;
        entry
            .delete_credential()
            .map_err(|e| StoreError::Keyring(e.to_string()))
    }
}

impl CredentialStore for FileStore {
    fn get(&self) -> Result<Option<CredentialPair>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let stored: StoredSession = serde_json::from_str(&content)?;
        if stored.version != STORE_VERSION {
            warn!("unknown session store version {}", stored.version);
        }

        // Prefer the keyring copy of the refresh token when present.
        let refresh_token = if self.keyring_available {
            self.keyring_get().unwrap_or(stored.refresh_token)
        } else {
            stored.refresh_token
        };

        Ok(Some(CredentialPair {
            access_token: stored.access_token,
            refresh_token,
        }))
    }

    fn set(&self, pair: &CredentialPair) -> Result<(), StoreError> {
        let stored = StoredSession {
            version: STORE_VERSION,
            access_token: pair.access_token.clone(),
            refresh_token: pair.refresh_token.clone(),
        };
        let content = serde_json::to_string_pretty(&stored)?;
        std::fs::write(&self.path, content)?;

        if self.keyring_available {
            if let Err(e) = self.keyring_set(&pair.refresh_token) {
                warn!("failed to store refresh token in keyring: {}", e);
            }
        }

        debug!("stored session to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        if self.keyring_available {
            let _ = self.keyring_remove();
        }
        debug!("cleared stored session");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (FileStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore {
            path: temp_dir.path().join("session.json"),
            keyring_available: false, // Don't use keyring in tests
        };
        (store, temp_dir)
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get().unwrap(), None);

        let pair = CredentialPair::new("access", "refresh");
        store.set(&pair).unwrap();
        assert_eq!(store.get().unwrap(), Some(pair));

        store.clear().unwrap();
        assert_eq!(store.get().unwrap(), None);
    }

    #[test]
    fn file_store_roundtrip() {
        let (store, _temp) = create_test_store();
        assert_eq!(store.get().unwrap(), None);

        let pair = CredentialPair::new("access", "refresh");
        store.set(&pair).unwrap();
        assert_eq!(store.get().unwrap(), Some(pair));
    }

    #[test]
    fn set_replaces_both_tokens() {
        let (store, _temp) = create_test_store();

        store.set(&CredentialPair::new("access-1", "refresh-1")).unwrap();
        store.set(&CredentialPair::new("access-2", "refresh-2")).unwrap();

        let pair = store.get().unwrap().unwrap();
        assert_eq!(pair.access_token, "access-2");
        assert_eq!(pair.refresh_token, "refresh-2");
    }

    #[test]
    fn clear_removes_the_file() {
        let (store, _temp) = create_test_store();

        store.set(&CredentialPair::new("access", "refresh")).unwrap();
        store.clear().unwrap();

        assert!(!store.path().exists());
        assert_eq!(store.get().unwrap(), None);

        // Clearing an already-empty store is fine.
        store.clear().unwrap();
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let (store, _temp) = create_test_store();
        std::fs::write(store.path(), "not json").unwrap();

        assert!(matches!(store.get(), Err(StoreError::Parse(_))));
    }
}
