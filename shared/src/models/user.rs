//! User Profile / Session Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::schema::{Entity, local_keys, tables};
use crate::validation::{MAX_NAME_LEN, validate_optional_email, validate_required_text};

/// Application role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(rename = "Super Admin")]
    SuperAdmin,
    Admin,
    #[default]
    User,
}

impl UserRole {
    pub fn is_admin(self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Admin)
    }

    /// Can see every region, not just its own
    pub fn sees_all_regions(self) -> bool {
        self == Self::SuperAdmin
    }
}

/// Profile row in the `users` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Auth provider user id
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub role: UserRole,
    pub branch_id: Option<String>,
    pub region: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for UserProfile {
    const TABLE: &'static str = tables::USERS;
    const LOCAL_KEY: &'static str = local_keys::USERS;
    const COLUMN_OVERRIDES: &'static [(&'static str, &'static str)] = &[("name", "full_name")];

    fn record_id(&self) -> &str {
        &self.id
    }
}

impl UserProfile {
    /// Region filter applied to this user's list queries
    pub fn region_scope(&self) -> Option<&str> {
        if self.role.sees_all_regions() {
            None
        } else {
            self.region.as_deref()
        }
    }
}

/// Create profile payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileCreate {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub branch_id: Option<String>,
    pub region: Option<String>,
}

impl UserProfileCreate {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_required_text(&self.id, "id", MAX_NAME_LEN)?;
        validate_required_text(&self.email, "email", MAX_NAME_LEN)?;
        validate_optional_email(&Some(self.email.clone()), "email")?;
        validate_required_text(&self.name, "name", MAX_NAME_LEN)
    }

    pub fn into_profile(self, at: DateTime<Utc>) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.trim().to_lowercase(),
            name: self.name.trim().to_string(),
            role: self.role,
            branch_id: self.branch_id,
            region: self.region,
            created_at: at,
        }
    }
}

/// Signed-in session as persisted under the secure auth keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub user: UserProfile,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}
