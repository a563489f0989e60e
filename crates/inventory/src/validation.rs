//! Field-level validation shared by catalog and movement inputs.

use stockledger_core::{DomainError, DomainResult};

pub(crate) const MAX_NAME_LEN: usize = 100;
pub(crate) const MAX_ADDRESS_LEN: usize = 200;
pub(crate) const MAX_NOTES_LEN: usize = 200;

/// Required, trimmed, length-limited text.
pub(crate) fn required_text(field: &str, value: &str, max: usize) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    if trimmed.chars().count() > max {
        return Err(DomainError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Optional text; blank input is normalized to `None`.
pub(crate) fn optional_text(
    field: &str,
    value: Option<&str>,
    max: Option<usize>,
) -> DomainResult<Option<String>> {
    let Some(trimmed) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if let Some(max) = max {
        if trimmed.chars().count() > max {
            return Err(DomainError::validation(format!(
                "{field} must be at most {max} characters"
            )));
        }
    }
    Ok(Some(trimmed.to_string()))
}
