//! Record identity
//!
//! Every record carries two identifiers:
//! - `id`: a UUID v4, the primary key in both stores
//! - a human-readable display code (`WAR-######`, `FV-######`, `CMP-######`)
//!   shown to customers and printed on warranty cards
//!
//! Display codes are not guaranteed unique; lookups by code return the
//! newest match.

use rand::Rng;
use uuid::Uuid;

use crate::util::now_millis;

/// Number of digits in a display code
pub const CODE_DIGITS: usize = 6;

/// Display code prefixes per entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePrefix {
    Warranty,
    FieldVisit,
    Complaint,
}

impl CodePrefix {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Warranty => "WAR",
            Self::FieldVisit => "FV",
            Self::Complaint => "CMP",
        }
    }
}

/// Generate a fresh primary key
pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a display code such as `WAR-482913`
///
/// Layout: low 3 digits of the millisecond clock followed by 3 random digits.
pub fn display_code(prefix: CodePrefix) -> String {
    let clock = now_millis().rem_euclid(1_000);
    let random: i64 = rand::thread_rng().gen_range(0..1_000);
    format!("{}-{:06}", prefix.as_str(), clock * 1_000 + random)
}

/// Check that `code` has the shape `<PREFIX>-` followed by exactly six digits
pub fn is_display_code(prefix: CodePrefix, code: &str) -> bool {
    code.strip_prefix(prefix.as_str())
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|digits| {
            digits.len() == CODE_DIGITS && digits.chars().all(|c| c.is_ascii_digit())
        })
}
