//! Storage backend strategy
//!
//! Decided once, when the client is built, and handed to every service.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::ClientConfig;
use crate::ClientResult;
use crate::remote::{
    AuthToken, BlobStore, HttpReachability, PostgrestStore, Reachability, RemoteRecordStore, RestClient,
    StorageBucketClient,
};

/// Where records live
#[derive(Clone)]
pub enum Backend {
    /// No remote project configured; the local record store is authoritative
    LocalOnly,
    /// Remote project is authoritative, local store is the fallback
    Remote(RemoteBackend),
}

/// Remote stores used in remote mode
#[derive(Clone)]
pub struct RemoteBackend {
    pub records: Arc<dyn RemoteRecordStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub reachability: Arc<dyn Reachability>,
    pub token: AuthToken,
}

impl RemoteBackend {
    pub fn new(
        records: Arc<dyn RemoteRecordStore>,
        blobs: Arc<dyn BlobStore>,
        reachability: Arc<dyn Reachability>,
    ) -> Self {
        Self {
            records,
            blobs,
            reachability,
            token: AuthToken::default(),
        }
    }
}

impl Backend {
    /// Build the backend from configuration
    ///
    /// Missing credentials select [`Backend::LocalOnly`] with a warning.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let Some(remote) = &config.remote else {
            warn!(
                "Remote store not configured (SUPABASE_URL / SUPABASE_ANON_KEY missing), running local-only"
            );
            return Ok(Self::LocalOnly);
        };

        let token = AuthToken::default();
        let rest = RestClient::new(remote.clone(), config.timeout, token.clone())?;
        let reachability = HttpReachability::new(
            rest.http().clone(),
            remote,
            Duration::from_millis(config.reachability_timeout_ms),
        );
        info!(url = %remote.url, "Remote store configured");

        Ok(Self::Remote(RemoteBackend {
            records: Arc::new(PostgrestStore::new(rest.clone())),
            blobs: Arc::new(StorageBucketClient::new(rest)),
            reachability: Arc::new(reachability),
            token,
        }))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    pub fn remote(&self) -> Option<&RemoteBackend> {
        match self {
            Self::Remote(remote) => Some(remote),
            Self::LocalOnly => None,
        }
    }

    /// Set or clear the signed-in user's access token
    pub fn set_access_token(&self, token: Option<String>) {
        if let Self::Remote(remote) = self {
            remote.token.set(token);
        }
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LocalOnly => f.write_str("LocalOnly"),
            Self::Remote(_) => f.write_str("Remote"),
        }
    }
}
