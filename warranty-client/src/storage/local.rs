//! Local Record Store
//!
//! Key → JSON string persistence on the device. Session keys are routed to
//! the OS secure store, everything else to the file store. Domain
//! collections live as one JSON array per entity; every read-modify-write of
//! a collection runs under the store's write lock so concurrent creates
//! cannot drop each other's records.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use shared::error::{AppError, ErrorCode};
use shared::schema::{Entity, local_keys};

use super::kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
use super::secure::{KeyringSecureStore, MemorySecureStore, SecureStore};
use crate::{ClientConfig, ClientError, ClientResult};

pub struct LocalStorage {
    files: Arc<dyn KeyValueStore>,
    secure: Arc<dyn SecureStore>,
    write_lock: Mutex<()>,
}

impl LocalStorage {
    pub fn new(files: Arc<dyn KeyValueStore>, secure: Arc<dyn SecureStore>) -> Self {
        Self {
            files,
            secure,
            write_lock: Mutex::new(()),
        }
    }

    /// File store under `config.data_dir`, OS keychain for secrets
    pub fn open(config: &ClientConfig) -> Self {
        Self::new(
            Arc::new(FileKeyValueStore::new(&config.data_dir)),
            Arc::new(KeyringSecureStore::new(&config.keyring_service)),
        )
    }

    /// Fully in-memory store
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryKeyValueStore::new()),
            Arc::new(MemorySecureStore::new()),
        )
    }

    // ========== Raw items ==========

    pub async fn get_item(&self, key: &str) -> ClientResult<Option<String>> {
        if local_keys::is_secure(key) {
            return self.secure_get(key).await;
        }
        if let Some(value) = self.files.get(key).await? {
            return Ok(Some(value));
        }

        // Older builds kept every key in the secure store
        match self.secure_get(key).await {
            Ok(Some(value)) => {
                info!(key, "Migrating legacy value from secure store");
                self.files.set(key, &value).await?;
                if let Err(e) = self.secure_delete(key).await {
                    warn!(key, error = %e, "Failed to remove migrated legacy value");
                }
                Ok(Some(value))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                warn!(key, error = %e, "Legacy secure lookup failed");
                Ok(None)
            }
        }
    }

    pub async fn set_item(&self, key: &str, value: &str) -> ClientResult<()> {
        if local_keys::is_secure(key) {
            self.secure_set(key, value).await
        } else {
            self.files.set(key, value).await
        }
    }

    pub async fn remove_item(&self, key: &str) -> ClientResult<()> {
        if local_keys::is_secure(key) {
            self.secure_delete(key).await
        } else {
            self.files.remove(key).await
        }
    }

    // ========== Collections ==========

    /// Whole collection for `E`; empty when nothing was stored yet
    pub async fn load_collection<E: Entity>(&self) -> ClientResult<Vec<E>> {
        let Some(raw) = self.get_item(E::LOCAL_KEY).await? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).map_err(|e| {
            warn!(key = E::LOCAL_KEY, error = %e, "Local collection is not readable");
            AppError::with_message(
                ErrorCode::LocalStorageCorrupted,
                format!("Local collection {} is corrupted: {e}", E::LOCAL_KEY),
            )
            .into()
        })
    }

    /// Replace the whole collection
    pub async fn save_collection<E: Entity>(&self, items: &[E]) -> ClientResult<()> {
        let _guard = self.write_lock.lock().await;
        self.write_collection(items).await
    }

    /// Serialized read-modify-write of one collection
    pub async fn update_collection<E, R, F>(&self, f: F) -> ClientResult<R>
    where
        E: Entity,
        F: FnOnce(&mut Vec<E>) -> ClientResult<R> + Send,
        R: Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut items = self.load_collection::<E>().await?;
        let out = f(&mut items)?;
        self.write_collection(&items).await?;
        Ok(out)
    }

    async fn write_collection<E: Entity>(&self, items: &[E]) -> ClientResult<()> {
        let raw = serde_json::to_string(items)?;
        self.set_item(E::LOCAL_KEY, &raw).await
    }

    // ========== Secure store (blocking pool) ==========

    async fn secure_get(&self, key: &str) -> ClientResult<Option<String>> {
        let secure = self.secure.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || secure.get(&key))
            .await
            .map_err(join_error)?
    }

    async fn secure_set(&self, key: &str, value: &str) -> ClientResult<()> {
        let secure = self.secure.clone();
        let (key, value) = (key.to_string(), value.to_string());
        tokio::task::spawn_blocking(move || secure.set(&key, &value))
            .await
            .map_err(join_error)?
    }

    async fn secure_delete(&self, key: &str) -> ClientResult<()> {
        let secure = self.secure.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || secure.delete(&key))
            .await
            .map_err(join_error)?
    }
}

fn join_error(e: tokio::task::JoinError) -> ClientError {
    tracing::error!("spawn_blocking join error: {e}");
    ClientError::Internal(format!("secure store task failed: {e}"))
}
