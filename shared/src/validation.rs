//! Input validation helpers
//!
//! Centralized text length constants and validation functions used by the
//! `*Create` payloads before a record is written anywhere.

use crate::error::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Customer / contact names, product models
pub const MAX_NAME_LEN: usize = 200;

/// Descriptions, notes, resolutions
pub const MAX_NOTE_LEN: usize = 2000;

/// Short identifiers: phone, serial number, invoice number
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

/// Image references (local paths or URLs)
pub const MAX_URL_LEN: usize = 2048;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::required(field));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate an optional email address (shape only)
pub fn validate_optional_email(value: &Option<String>, field: &str) -> Result<(), AppError> {
    validate_optional_text(value, field, MAX_EMAIL_LEN)?;
    if let Some(v) = value {
        let v = v.trim();
        if v.is_empty() {
            return Ok(());
        }
        let valid = v
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !valid {
            return Err(
                AppError::validation(format!("{field} is not a valid email address"))
                    .with_detail("field", field),
            );
        }
    }
    Ok(())
}

/// Validate a list of image references
pub fn validate_image_refs(refs: &[String]) -> Result<(), AppError> {
    for r in refs {
        validate_required_text(r, "imageUri", MAX_URL_LEN)?;
    }
    Ok(())
}
