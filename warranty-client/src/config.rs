//! Client configuration
//!
//! # Environment variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | SUPABASE_URL | - | Remote project URL |
//! | SUPABASE_ANON_KEY | - | Remote anon key |
//! | WARRANTY_PRO_DATA_DIR | .warranty-pro | Local record store directory |
//! | WARRANTY_PRO_TIMEOUT_SECS | 30 | Remote request timeout |
//! | WARRANTY_PRO_LOG_LEVEL | info | Log level |
//! | WARRANTY_PRO_LOG_DIR | - | Daily rolling log file directory |
//!
//! Remote mode needs both `SUPABASE_URL` and `SUPABASE_ANON_KEY`; with either
//! one missing the client runs local-only.

use std::path::PathBuf;

pub const DEFAULT_DATA_DIR: &str = ".warranty-pro";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REACHABILITY_TIMEOUT_MS: u64 = 3000;
pub const DEFAULT_PROFILE_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_PROFILE_RETRY_DELAY_MS: u64 = 1000;

/// Remote project credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Project URL without trailing slash
    pub url: String,
    pub anon_key: String,
}

impl RemoteConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    /// `{url}/rest/v1/{table}`
    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url, table)
    }

    /// `{url}/storage/v1/object/{bucket}/{path}`
    pub fn object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.url, bucket, path)
    }

    /// `{url}/storage/v1/object/public/{bucket}/{path}`
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.url, bucket, path)
    }

    /// Endpoint used by the reachability check
    pub fn health_url(&self) -> String {
        format!("{}/auth/v1/health", self.url)
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Remote store; `None` runs local-only
    pub remote: Option<RemoteConfig>,

    /// Local record store directory (also holds local image copies)
    pub data_dir: PathBuf,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Reachability check timeout in milliseconds
    pub reachability_timeout_ms: u64,

    /// Profile row creation attempts
    pub profile_retry_attempts: u32,

    /// Base delay between profile creation attempts (multiplied by attempt)
    pub profile_retry_delay_ms: u64,

    /// Service name used for OS keychain entries
    pub keyring_service: String,

    pub log_level: Option<String>,
    pub log_dir: Option<String>,
}

impl ClientConfig {
    /// Local-only configuration rooted at `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            remote: None,
            data_dir: data_dir.into(),
            timeout: DEFAULT_TIMEOUT_SECS,
            reachability_timeout_ms: DEFAULT_REACHABILITY_TIMEOUT_MS,
            profile_retry_attempts: DEFAULT_PROFILE_RETRY_ATTEMPTS,
            profile_retry_delay_ms: DEFAULT_PROFILE_RETRY_DELAY_MS,
            keyring_service: crate::storage::KEYRING_SERVICE.to_string(),
            log_level: None,
            log_dir: None,
        }
    }

    /// Load from the process environment (after reading `.env`, if any)
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let remote = match (var("SUPABASE_URL"), var("SUPABASE_ANON_KEY")) {
            (Some(url), Some(key)) => Some(RemoteConfig::new(url, key)),
            _ => None,
        };

        let mut config = Self::new(
            var("WARRANTY_PRO_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.into()),
        );
        config.remote = remote;
        config.timeout = var("WARRANTY_PRO_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        config.log_level = var("WARRANTY_PRO_LOG_LEVEL");
        config.log_dir = var("WARRANTY_PRO_LOG_DIR");
        config
    }

    /// Set the remote store credentials
    pub fn with_remote(mut self, url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        self.remote = Some(RemoteConfig::new(url, anon_key));
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    pub fn with_reachability_timeout_ms(mut self, ms: u64) -> Self {
        self.reachability_timeout_ms = ms;
        self
    }

    /// Set profile creation retry policy
    pub fn with_profile_retry(mut self, attempts: u32, base_delay_ms: u64) -> Self {
        self.profile_retry_attempts = attempts;
        self.profile_retry_delay_ms = base_delay_ms;
        self
    }

    pub fn with_keyring_service(mut self, service: impl Into<String>) -> Self {
        self.keyring_service = service.into();
        self
    }

    pub fn with_log(mut self, level: Option<String>, dir: Option<String>) -> Self {
        self.log_level = level;
        self.log_dir = dir;
        self
    }

    pub fn is_remote_configured(&self) -> bool {
        self.remote.is_some()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}
