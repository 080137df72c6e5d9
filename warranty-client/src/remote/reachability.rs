//! Network reachability check

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::config::RemoteConfig;

/// Answers "can the remote project be reached right now?"
#[async_trait]
pub trait Reachability: Send + Sync {
    async fn is_reachable(&self) -> bool;
}

/// Checks the project's health endpoint; any HTTP response counts as online
#[derive(Debug, Clone)]
pub struct HttpReachability {
    client: Client,
    url: String,
    anon_key: String,
    timeout: Duration,
}

impl HttpReachability {
    pub fn new(client: Client, remote: &RemoteConfig, timeout: Duration) -> Self {
        Self {
            client,
            url: remote.health_url(),
            anon_key: remote.anon_key.clone(),
            timeout,
        }
    }
}

#[async_trait]
impl Reachability for HttpReachability {
    async fn is_reachable(&self) -> bool {
        let result = self
            .client
            .get(&self.url)
            .header("apikey", &self.anon_key)
            .timeout(self.timeout)
            .send()
            .await;
        match result {
            Ok(_) => true,
            Err(e) => {
                debug!(url = %self.url, error = %e, "Remote not reachable");
                false
            }
        }
    }
}

/// Fixed answer
#[derive(Debug, Clone, Copy)]
pub struct FixedReachability(pub bool);

#[async_trait]
impl Reachability for FixedReachability {
    async fn is_reachable(&self) -> bool {
        self.0
    }
}
