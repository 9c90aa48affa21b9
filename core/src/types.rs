//! Domain types for the todo service.
//!
//! # Design
//! `Todo` is the stored record and also the wire shape returned to clients.
//! Input payloads reject unknown fields so typos surface as errors instead of
//! being ignored. `UpdateTodo` wraps each field in `Field<T>` so "absent"
//! and "present" stay distinct all the way down to the repository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier assigned by the repository. Always positive once issued.
pub type TodoId = i64;

/// A single todo item as stored and as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a todo.
///
/// A missing `title` decodes to an empty string so the service can report it
/// as `TitleRequired` alongside the other title rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CreateTodo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

/// Payload for a partial update. Only `Set` fields are applied.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct UpdateTodo {
    #[serde(default)]
    pub title: Field<String>,
    #[serde(default)]
    pub description: Field<String>,
    #[serde(default)]
    pub completed: Field<bool>,
}

/// Presence-aware value for partial updates.
///
/// `Unset` means the key was absent from the payload. `Set("")` is a real
/// value and is applied. JSON `null` is not accepted for any field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    Unset,
    Set(T),
}

impl<T> Field<T> {
    /// Apply `f` to a set value, short-circuiting on its error.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Field<U>, E> {
        match self {
            Field::Unset => Ok(Field::Unset),
            Field::Set(value) => f(value).map(Field::Set),
        }
    }

    /// Overwrite `target` when set; leave it untouched otherwise.
    pub fn apply_to(self, target: &mut T) {
        if let Field::Set(value) = self {
            *target = value;
        }
    }
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Unset
    }
}

// Only reached when the key is present; absence is handled by `#[serde(default)]`.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Field::Set)
    }
}

/// Criteria for `get_filtered`. Both conditions must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoFilter {
    /// Match only todos with this completion state.
    pub completed: Option<bool>,
    /// Case-insensitive substring of title or description. Empty matches all.
    pub search: String,
}

impl TodoFilter {
    pub fn new(completed: Option<bool>, search: impl Into<String>) -> Self {
        Self {
            completed,
            search: search.into(),
        }
    }

    /// Build a reusable predicate; lowercases the search text once.
    pub fn matcher(&self) -> impl Fn(&Todo) -> bool + '_ {
        let needle = self.search.to_lowercase();
        move |todo: &Todo| {
            if let Some(completed) = self.completed {
                if todo.completed != completed {
                    return false;
                }
            }
            needle.is_empty()
                || todo.title.to_lowercase().contains(&needle)
                || todo.description.to_lowercase().contains(&needle)
        }
    }
}
