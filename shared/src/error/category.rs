//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 3xxx: Sale errors
/// - 4xxx: Field visit errors
/// - 5xxx: Complaint errors
/// - 6xxx: Stock errors
/// - 7xxx: Storage errors
/// - 8xxx, 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Sale / warranty errors (3xxx)
    Sale,
    /// Field visit errors (4xxx)
    FieldVisit,
    /// Complaint errors (5xxx)
    Complaint,
    /// Stock errors (6xxx)
    Stock,
    /// Storage errors (7xxx)
    Storage,
    /// System errors (8xxx, 9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Sale,
            4000..5000 => Self::FieldVisit,
            5000..6000 => Self::Complaint,
            6000..7000 => Self::Stock,
            7000..8000 => Self::Storage,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Sale => "sale",
            Self::FieldVisit => "field_visit",
            Self::Complaint => "complaint",
            Self::Stock => "stock",
            Self::Storage => "storage",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
