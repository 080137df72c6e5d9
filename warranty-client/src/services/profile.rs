//! Session persistence and user profiles
//!
//! The session lives under the secure auth keys: the access token on its
//! own, the whole session JSON under the user key.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use shared::error::{AppError, ErrorCode};
use shared::models::{Session, UserProfile, UserProfileCreate};
use shared::schema::{RecordFilter, local_keys};
use shared::util::now;

use super::repository::Repository;
use crate::backend::Backend;
use crate::storage::LocalStorage;
use crate::{ClientConfig, ClientResult};

/// Reads and writes the signed-in session
#[derive(Clone)]
pub struct SessionStore {
    local: Arc<LocalStorage>,
}

impl SessionStore {
    pub fn new(local: Arc<LocalStorage>) -> Self {
        Self { local }
    }

    pub async fn save(&self, session: &Session) -> ClientResult<()> {
        self.local
            .set_item(local_keys::AUTH_TOKEN, &session.access_token)
            .await?;
        self.local
            .set_item(local_keys::AUTH_USER, &serde_json::to_string(session)?)
            .await
    }

    pub async fn load(&self) -> ClientResult<Option<Session>> {
        let Some(raw) = self.local.get_item(local_keys::AUTH_USER).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(error = %e, "Stored session is not readable, discarding");
                self.clear().await?;
                Ok(None)
            }
        }
    }

    pub async fn clear(&self) -> ClientResult<()> {
        self.local.remove_item(local_keys::AUTH_TOKEN).await?;
        self.local.remove_item(local_keys::AUTH_USER).await
    }
}

/// Retry policy for profile row creation
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay after failed attempt `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

#[derive(Clone)]
pub struct ProfileService {
    repo: Repository<UserProfile>,
    sessions: SessionStore,
    backend: Backend,
    retry: RetryPolicy,
}

impl ProfileService {
    pub fn new(
        repo: Repository<UserProfile>,
        sessions: SessionStore,
        backend: Backend,
        config: &ClientConfig,
    ) -> Self {
        Self {
            repo,
            sessions,
            backend,
            retry: RetryPolicy {
                attempts: config.profile_retry_attempts.max(1),
                base_delay: Duration::from_millis(config.profile_retry_delay_ms),
            },
        }
    }

    // ========== Session ==========

    /// Persist a freshly signed-in session and use its token
    pub async fn sign_in(&self, session: Session) -> ClientResult<Session> {
        self.sessions.save(&session).await?;
        self.backend
            .set_access_token(Some(session.access_token.clone()));
        info!(user = %session.user.email, "Session stored");
        Ok(session)
    }

    /// Restore the stored session, discarding it if expired
    pub async fn restore_session(&self) -> ClientResult<Option<Session>> {
        let Some(session) = self.sessions.load().await? else {
            return Ok(None);
        };
        if session.is_expired(now()) {
            info!(user = %session.user.email, "Stored session expired");
            self.sign_out().await?;
            return Ok(None);
        }
        self.backend
            .set_access_token(Some(session.access_token.clone()));
        Ok(Some(session))
    }

    pub async fn sign_out(&self) -> ClientResult<()> {
        self.backend.set_access_token(None);
        self.sessions.clear().await
    }

    // ========== Profiles ==========

    pub async fn find_by_email(&self, email: &str) -> Option<UserProfile> {
        let filter = RecordFilter::new().eq("email", email.trim().to_lowercase());
        self.repo.find_by(&filter).await
    }

    pub async fn get(&self, id: &str) -> Option<UserProfile> {
        self.repo.find(id).await
    }

    /// Create the profile row, retrying with linearly increasing delay
    pub async fn create_profile(&self, input: UserProfileCreate) -> ClientResult<UserProfile> {
        input.validate()?;
        let profile = input.into_profile(now());

        let mut last_error = None;
        for attempt in 1..=self.retry.attempts {
            match self.repo.insert(profile.clone()).await {
                Ok(created) => {
                    info!(id = %created.id, attempt, "Profile created");
                    return Ok(created);
                }
                Err(e) => {
                    warn!(id = %profile.id, attempt, error = %e, "Profile creation failed");
                    if attempt < self.retry.attempts {
                        tokio::time::sleep(self.retry.delay_for(attempt)).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        let reason = last_error.map(|e| e.to_string()).unwrap_or_default();
        Err(AppError::with_message(
            ErrorCode::ProfileCreateFailed,
            format!(
                "Profile creation failed after {} attempts: {reason}",
                self.retry.attempts
            ),
        )
        .with_detail("id", profile.id)
        .into())
    }

    /// Existing profile for the email, or a newly created one
    pub async fn ensure_profile(&self, input: UserProfileCreate) -> ClientResult<UserProfile> {
        if let Some(existing) = self.find_by_email(&input.email).await {
            return Ok(existing);
        }
        self.create_profile(input).await
    }
}
