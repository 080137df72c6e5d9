//! Shared types for Warranty Pro
//!
//! Domain models, error codes, record ids, row mapping and validation
//! helpers used by the client data layer.

pub mod error;
pub mod ids;
pub mod models;
pub mod schema;
pub mod util;
pub mod validation;

// Re-exports
pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use http;
pub use schema::{Entity, RecordFilter};
pub use serde::{Deserialize, Serialize};
