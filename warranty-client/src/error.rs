//! Client error types

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote store rejected the request with an error body
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Local file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// OS secure store failed
    #[error("Secure storage error: {0}")]
    SecureStore(String),

    /// Remote store credentials are missing
    #[error("Remote store not configured")]
    RemoteNotConfigured,

    /// Domain error (validation, transitions, lookups)
    #[error(transparent)]
    App(#[from] AppError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ClientError {
    /// Numeric error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Http(e) if e.is_timeout() => ErrorCode::TimeoutError,
            Self::Http(_) => ErrorCode::NetworkError,
            Self::Api { status, .. } => reqwest::StatusCode::from_u16(*status)
                .map(ErrorCode::from_http_status)
                .unwrap_or(ErrorCode::RemoteWriteRejected),
            Self::InvalidResponse(_) => ErrorCode::InvalidFormat,
            Self::Unauthorized => ErrorCode::NotAuthenticated,
            Self::Forbidden(_) => ErrorCode::PermissionDenied,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Validation(_) => ErrorCode::ValidationFailed,
            Self::Io(_) => ErrorCode::LocalStorageFailed,
            Self::Serialization(_) => ErrorCode::SerializationError,
            Self::SecureStore(_) => ErrorCode::SecureStorageFailed,
            Self::RemoteNotConfigured => ErrorCode::RemoteNotConfigured,
            Self::App(e) => e.code,
            Self::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Lookup miss, either remote 404 or a domain not-found code
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
            || matches!(
                self.code(),
                ErrorCode::NotFound
                    | ErrorCode::SaleNotFound
                    | ErrorCode::FieldVisitNotFound
                    | ErrorCode::ComplaintNotFound
                    | ErrorCode::StockNotFound
                    | ErrorCode::ProfileNotFound
            )
    }
}

impl From<keyring::Error> for ClientError {
    fn from(e: keyring::Error) -> Self {
        Self::SecureStore(e.to_string())
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(ClientError::Unauthorized.code(), ErrorCode::NotAuthenticated);
        assert_eq!(
            ClientError::Api {
                status: 409,
                code: Some("23505".into()),
                message: "duplicate key".into(),
            }
            .code(),
            ErrorCode::AlreadyExists
        );
        assert_eq!(
            ClientError::Api {
                status: 400,
                code: None,
                message: "bad column".into(),
            }
            .code(),
            ErrorCode::RemoteWriteRejected
        );
        let app = AppError::new(ErrorCode::SaleNotFound);
        let err = ClientError::from(app);
        assert_eq!(err.code(), ErrorCode::SaleNotFound);
        assert!(err.is_not_found());
        assert!(!ClientError::Unauthorized.is_not_found());
    }
}
