//! Error type shared by the repository and service layers.
//!
//! # Design
//! Storage only ever reports `NotFound` or `Cancelled` (plus `Storage` for
//! backends that can fail on their own). The service adds the validation
//! variants. Display strings of the validation variants are shown to clients
//! verbatim, so they stay short and free of internal detail.

use crate::validation::{MAX_DESCRIPTION_CHARS, MAX_TITLE_CHARS};

/// Errors returned by `TodoRepository` and `TodoService` operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TodoError {
    /// No todo exists with the requested id.
    #[error("todo not found")]
    NotFound,

    /// The title is empty after trimming whitespace.
    #[error("title required")]
    TitleRequired,

    #[error("title is too long (max {})", MAX_TITLE_CHARS)]
    TitleTooLong,

    #[error("description is too long (max {})", MAX_DESCRIPTION_CHARS)]
    DescriptionTooLong,

    /// Ids are positive; zero and negatives are rejected before storage is
    /// consulted.
    #[error("invalid id")]
    InvalidId,

    /// The caller abandoned the request before the operation ran.
    #[error("operation cancelled")]
    Cancelled,

    /// A storage backend failed for reasons unrelated to the request.
    #[error("storage failure: {0}")]
    Storage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_name_the_limits() {
        assert_eq!(TodoError::TitleTooLong.to_string(), "title is too long (max 255)");
        assert_eq!(
            TodoError::DescriptionTooLong.to_string(),
            "description is too long (max 1000)"
        );
    }
}
