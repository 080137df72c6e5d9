//! Authenticated HTTP access to the remote project
//!
//! Every request carries the project `apikey` header and a Bearer token:
//! the signed-in user's access token when there is one, otherwise the anon
//! key.

use parking_lot::RwLock;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use crate::config::RemoteConfig;
use crate::{ClientError, ClientResult};

/// Error body returned by the remote API
///
/// Table errors carry `code`/`message`, storage errors `error`/`message`.
#[derive(serde::Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    error: Option<String>,
    message: String,
}

/// Access token shared by every client built from one backend
#[derive(Debug, Clone, Default)]
pub struct AuthToken(Arc<RwLock<Option<String>>>);

impl AuthToken {
    pub fn set(&self, token: Option<String>) {
        *self.0.write() = token;
    }

    pub fn get(&self) -> Option<String> {
        self.0.read().clone()
    }
}

/// HTTP client bound to one remote project
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    remote: RemoteConfig,
    token: AuthToken,
}

impl RestClient {
    pub fn new(remote: RemoteConfig, timeout_secs: u64, token: AuthToken) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            remote,
            token,
        })
    }

    pub fn remote(&self) -> &RemoteConfig {
        &self.remote
    }

    /// Underlying client (unauthenticated requests)
    pub fn http(&self) -> &Client {
        &self.client
    }

    pub fn token(&self) -> &AuthToken {
        &self.token
    }

    fn bearer(&self) -> String {
        let token = self
            .token
            .get()
            .unwrap_or_else(|| self.remote.anon_key.clone());
        format!("Bearer {}", token)
    }

    /// Start an authenticated request
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.remote.anon_key)
            .header(reqwest::header::AUTHORIZATION, self.bearer())
    }

    /// Send and decode a JSON body
    pub async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Send and ignore the body
    pub async fn send_empty(&self, request: RequestBuilder) -> ClientResult<()> {
        let response = request.send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn check_status(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await?;
        // Try the API error format first
        if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&text) {
            return Err(ClientError::Api {
                status: status.as_u16(),
                code: api_err.code.or(api_err.error),
                message: api_err.message,
            });
        }
        Err(match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => ClientError::Forbidden(text),
            StatusCode::NOT_FOUND => ClientError::NotFound(text),
            StatusCode::BAD_REQUEST => ClientError::Validation(text),
            _ => ClientError::Api {
                status: status.as_u16(),
                code: None,
                message: text,
            },
        })
    }
}
