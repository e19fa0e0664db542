//! Internal helpers for validation and conversion.
//!
//! These utilities are **not** part of the public API.

use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::KeyNotFound(format!("invalid {label} id")))
}

/// Trim a required name, rejecting empty values.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidExpense(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Canonical form of a user handle: NFKC, lowercase, no surrounding spaces
/// and no leading `@`.
pub(crate) fn normalize_handle(value: &str) -> Option<String> {
    let trimmed = value.trim();
    let trimmed = trimmed.strip_prefix('@').unwrap_or(trimmed).trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.nfkc().flat_map(char::to_lowercase).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_case_and_width_insensitive() {
        assert_eq!(normalize_handle(" @Alice "), Some("alice".to_string()));
        assert_eq!(normalize_handle("ＢＯＢ"), Some("bob".to_string()));
        assert_eq!(normalize_handle("@"), None);
        assert_eq!(normalize_handle("   "), None);
    }

    #[test]
    fn optional_text_drops_blank_values() {
        assert_eq!(normalize_optional_text(Some("  ")), None);
        assert_eq!(
            normalize_optional_text(Some(" food ")),
            Some("food".to_string())
        );
        assert_eq!(normalize_optional_text(None), None);
    }
}
