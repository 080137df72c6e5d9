//! Unified error codes for the Warranty Pro data layer
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication / profile errors
//! - 2xxx: Permission errors
//! - 3xxx: Sale / warranty errors
//! - 4xxx: Field visit errors
//! - 5xxx: Complaint errors
//! - 6xxx: Stock errors
//! - 7xxx: Storage errors (local store, remote store, blob uploads)
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so they survive the trip
/// through JSON to the presentation layer unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Session has expired
    SessionExpired = 1005,
    /// Profile row not found for the signed-in user
    ProfileNotFound = 1101,
    /// Profile row could not be created after all retries
    ProfileCreateFailed = 1102,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,

    // ==================== 3xxx: Sale ====================
    /// Sale / warranty not found
    SaleNotFound = 3001,
    /// Sale status change not allowed
    SaleStatusTransition = 3002,

    // ==================== 4xxx: Field visit ====================
    /// Field visit not found
    FieldVisitNotFound = 4001,
    /// Field visit status change not allowed
    FieldVisitStatusTransition = 4002,

    // ==================== 5xxx: Complaint ====================
    /// Complaint not found
    ComplaintNotFound = 5001,
    /// Complaint status change not allowed
    ComplaintStatusTransition = 5002,

    // ==================== 6xxx: Stock ====================
    /// Stock entry not found
    StockNotFound = 6001,
    /// Quantity would drop below zero
    StockNegativeQuantity = 6002,

    // ==================== 7xxx: Storage ====================
    /// Local record store read/write failed
    LocalStorageFailed = 7001,
    /// Local record store content could not be parsed
    LocalStorageCorrupted = 7002,
    /// Secure store (OS keyring) failed
    SecureStorageFailed = 7003,
    /// Remote store rejected the write (validation / permission)
    RemoteWriteRejected = 7101,
    /// Remote store is not configured
    RemoteNotConfigured = 7102,
    /// Blob upload failed
    UploadFailed = 7201,
    /// Local image could not be read
    ImageReadFailed = 7202,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Serialization error
    SerializationError = 9006,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::SessionExpired => "Session has expired",
            ErrorCode::ProfileNotFound => "User profile not found",
            ErrorCode::ProfileCreateFailed => "Failed to create user profile",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",

            // Sale
            ErrorCode::SaleNotFound => "Sale not found",
            ErrorCode::SaleStatusTransition => "Sale status change is not allowed",

            // Field visit
            ErrorCode::FieldVisitNotFound => "Field visit not found",
            ErrorCode::FieldVisitStatusTransition => "Field visit status change is not allowed",

            // Complaint
            ErrorCode::ComplaintNotFound => "Complaint not found",
            ErrorCode::ComplaintStatusTransition => "Complaint status change is not allowed",

            // Stock
            ErrorCode::StockNotFound => "Stock entry not found",
            ErrorCode::StockNegativeQuantity => "Stock quantity cannot be negative",

            // Storage
            ErrorCode::LocalStorageFailed => "Local storage operation failed",
            ErrorCode::LocalStorageCorrupted => "Local storage data is corrupted",
            ErrorCode::SecureStorageFailed => "Secure storage operation failed",
            ErrorCode::RemoteWriteRejected => "Remote store rejected the write",
            ErrorCode::RemoteNotConfigured => "Remote store is not configured",
            ErrorCode::UploadFailed => "Image upload failed",
            ErrorCode::ImageReadFailed => "Image could not be read",

            // System
            ErrorCode::InternalError => "Internal error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::SerializationError => "Serialization error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1005 => Ok(ErrorCode::SessionExpired),
            1101 => Ok(ErrorCode::ProfileNotFound),
            1102 => Ok(ErrorCode::ProfileCreateFailed),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),

            // Sale
            3001 => Ok(ErrorCode::SaleNotFound),
            3002 => Ok(ErrorCode::SaleStatusTransition),

            // Field visit
            4001 => Ok(ErrorCode::FieldVisitNotFound),
            4002 => Ok(ErrorCode::FieldVisitStatusTransition),

            // Complaint
            5001 => Ok(ErrorCode::ComplaintNotFound),
            5002 => Ok(ErrorCode::ComplaintStatusTransition),

            // Stock
            6001 => Ok(ErrorCode::StockNotFound),
            6002 => Ok(ErrorCode::StockNegativeQuantity),

            // Storage
            7001 => Ok(ErrorCode::LocalStorageFailed),
            7002 => Ok(ErrorCode::LocalStorageCorrupted),
            7003 => Ok(ErrorCode::SecureStorageFailed),
            7101 => Ok(ErrorCode::RemoteWriteRejected),
            7102 => Ok(ErrorCode::RemoteNotConfigured),
            7201 => Ok(ErrorCode::UploadFailed),
            7202 => Ok(ErrorCode::ImageReadFailed),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9006 => Ok(ErrorCode::SerializationError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
