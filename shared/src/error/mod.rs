//! Unified error system
//!
//! This module provides:
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication / profile errors
//! - 2xxx: Permission errors
//! - 3xxx: Sale errors
//! - 4xxx: Field visit errors
//! - 5xxx: Complaint errors
//! - 6xxx: Stock errors
//! - 7xxx: Storage errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::SaleNotFound);
//! assert_eq!(err.message, "Sale not found");
//!
//! let err = AppError::validation("Invalid phone number")
//!     .with_detail("field", "customerPhone");
//! assert_eq!(err.code, ErrorCode::ValidationFailed);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
