//! Input rules applied by the service before anything reaches storage.
//!
//! Lengths are counted in characters, not bytes, so multi-byte titles get
//! the same budget as ASCII ones.

use crate::error::TodoError;
use crate::types::TodoId;

pub const MAX_TITLE_CHARS: usize = 255;
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

/// Trim `title` and check it is non-empty and within the length limit.
pub fn normalize_title(title: &str) -> Result<String, TodoError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TodoError::TitleRequired);
    }
    if trimmed.chars().count() > MAX_TITLE_CHARS {
        return Err(TodoError::TitleTooLong);
    }
    Ok(trimmed.to_string())
}

/// Trim `description` and check the length limit. Empty is allowed.
pub fn normalize_description(description: &str) -> Result<String, TodoError> {
    let trimmed = description.trim();
    if trimmed.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(TodoError::DescriptionTooLong);
    }
    Ok(trimmed.to_string())
}

/// Check the length of `description` as sent, then trim it.
///
/// Used for updates, where surrounding whitespace counts against the limit.
pub fn check_then_trim_description(description: &str) -> Result<String, TodoError> {
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(TodoError::DescriptionTooLong);
    }
    Ok(description.trim().to_string())
}

pub fn validate_id(id: TodoId) -> Result<TodoId, TodoError> {
    if id <= 0 {
        return Err(TodoError::InvalidId);
    }
    Ok(id)
}
