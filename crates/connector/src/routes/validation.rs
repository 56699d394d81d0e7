//! Request parameter checks.
//!
//! Identifiers must be UUIDs and names must be non-empty after trimming.
//! Failures become `AppError::Validation` (HTTP 400) before any iiko call.

use iiko_connector_core::PosIdError;

use crate::error::AppError;

/// Parse a required identifier.
///
/// # Errors
///
/// Returns `AppError::Validation` if the value is missing, blank or not a UUID.
pub fn required_id<T>(
    raw: Option<&str>,
    label: &str,
    parse: impl FnOnce(&str) -> Result<T, PosIdError>,
) -> Result<T, AppError> {
    match raw {
        Some(raw) => parse(raw).map_err(|e| id_error(label, &e)),
        None => Err(id_error(label, &PosIdError::Empty)),
    }
}

/// Parse an optional identifier. Missing and blank values are `None`.
///
/// # Errors
///
/// Returns `AppError::Validation` if a value is present but not a UUID.
pub fn optional_id<T>(
    raw: Option<&str>,
    label: &str,
    parse: impl FnOnce(&str) -> Result<T, PosIdError>,
) -> Result<Option<T>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => parse(raw).map(Some).map_err(|e| id_error(label, &e)),
        None => Ok(None),
    }
}

/// Trimmed name, or `None` when missing or blank.
#[must_use]
pub fn optional_name(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

fn id_error(label: &str, error: &PosIdError) -> AppError {
    match error {
        PosIdError::Empty => AppError::Validation(format!("{label} ID is empty.")),
        PosIdError::Malformed(raw) => {
            AppError::Validation(format!("{label} ID '{raw}' is not a valid UUID."))
        }
    }
}
