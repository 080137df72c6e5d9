//! Classification of remote HTTP failures
//!
//! The remote store speaks HTTP; rejected requests are classified into an
//! [`ErrorCode`] from their status so callers get the same codes in both
//! remote and local mode.

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Classify a non-success response from the remote store
    pub fn from_http_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::NotAuthenticated,
            StatusCode::FORBIDDEN => Self::PermissionDenied,
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::CONFLICT => Self::AlreadyExists,
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => Self::TimeoutError,
            StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE => Self::NetworkError,
            s if s.is_client_error() => Self::RemoteWriteRejected,
            s if s.is_server_error() => Self::InternalError,
            _ => Self::Unknown,
        }
    }
}
