//! OS secure store for session secrets
//!
//! Calls are synchronous (the platform keychain APIs block); the local
//! record store runs them on the blocking pool.

use keyring::Entry;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;

use crate::{ClientError, ClientResult};

/// Keychain service name
pub const KEYRING_SERVICE: &str = "warranty-pro";

/// Secret key → value store
pub trait SecureStore: Send + Sync {
    fn get(&self, key: &str) -> ClientResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> ClientResult<()>;
    fn delete(&self, key: &str) -> ClientResult<()>;
}

/// Platform keychain via `keyring`
#[derive(Debug, Clone)]
pub struct KeyringSecureStore {
    service: String,
}

impl KeyringSecureStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> ClientResult<Entry> {
        Entry::new(&self.service, key).map_err(ClientError::from)
    }
}

impl Default for KeyringSecureStore {
    fn default() -> Self {
        Self::new(KEYRING_SERVICE)
    }
}

impl SecureStore for KeyringSecureStore {
    fn get(&self, key: &str) -> ClientResult<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        self.entry(key)?.set_password(value)?;
        debug!(key, "Secure value saved");
        Ok(())
    }

    fn delete(&self, key: &str) -> ClientResult<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory secure store
#[derive(Debug, Default)]
pub struct MemorySecureStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySecureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed an entry
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.entries.lock().insert(key.to_string(), value.to_string());
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }
}

impl SecureStore for MemorySecureStore {
    fn get(&self, key: &str) -> ClientResult<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> ClientResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}
