//! Bounded-text helpers for POS payloads.
//!
//! iiko documents a maximum length for most string fields of a delivery.
//! Values are truncated to that length rather than rejected, counting
//! characters, not bytes, so Cyrillic addresses are cut at the same place as
//! Latin ones.

/// Truncate `value` to at most `max` characters.
#[must_use]
pub fn truncate_chars(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((byte_idx, _)) => value.get(..byte_idx).unwrap_or(value).to_owned(),
        None => value.to_owned(),
    }
}

/// Keep only ASCII digits (phone normalization).
#[must_use]
pub fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Lowercase and keep only `[a-z0-9_-]`.
///
/// Applied to identifiers read back from storefront metadata before they are
/// sent to iiko.
#[must_use]
pub fn sanitize_key(value: &str) -> String {
    value
        .chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-')
        .collect()
}
