//! Storage contract and the in-memory store behind it.
//!
//! # Design
//! One `tokio::sync::RwLock` guards both the records and the id counter, so
//! id allocation and insertion happen in the same critical section. Writers
//! take the write half, lookups and scans take the read half. Every method
//! hands back clones; nothing outside this module can reach into the map.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::error::TodoError;
use crate::types::{CreateTodo, Todo, TodoFilter, TodoId, UpdateTodo};

/// Atomic CRUD and filtering over todo records.
///
/// Implementations must return owned copies and must fail with
/// `TodoError::Cancelled` when handed an already-cancelled token.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    async fn create(&self, input: CreateTodo, cancel: &CancellationToken) -> Result<Todo, TodoError>;

    async fn get_by_id(&self, id: TodoId, cancel: &CancellationToken) -> Result<Todo, TodoError>;

    async fn get_all(&self, cancel: &CancellationToken) -> Result<Vec<Todo>, TodoError>;

    async fn update(
        &self,
        id: TodoId,
        input: UpdateTodo,
        cancel: &CancellationToken,
    ) -> Result<Todo, TodoError>;

    async fn delete(&self, id: TodoId, cancel: &CancellationToken) -> Result<(), TodoError>;

    async fn get_filtered(
        &self,
        filter: &TodoFilter,
        cancel: &CancellationToken,
    ) -> Result<Vec<Todo>, TodoError>;
}

struct Store {
    todos: BTreeMap<TodoId, Todo>,
    next_id: TodoId,
}

/// Process-local store. Lives as long as its owner; nothing is persisted.
pub struct InMemoryTodoRepository {
    store: RwLock<Store>,
    clock: Arc<dyn Clock>,
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            store: RwLock::new(Store {
                todos: BTreeMap::new(),
                next_id: 1,
            }),
            clock,
        }
    }
}

impl Default for InMemoryTodoRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_active(cancel: &CancellationToken) -> Result<(), TodoError> {
    if cancel.is_cancelled() {
        return Err(TodoError::Cancelled);
    }
    Ok(())
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn create(&self, input: CreateTodo, cancel: &CancellationToken) -> Result<Todo, TodoError> {
        ensure_active(cancel)?;
        let mut store = self.store.write().await;

        let now = self.clock.now();
        let id = store.next_id;
        let todo = Todo {
            id,
            title: input.title,
            description: input.description,
            completed: input.completed,
            created_at: now,
            updated_at: now,
        };
        store.todos.insert(id, todo.clone());
        store.next_id += 1;

        debug!(id, "todo stored");
        Ok(todo)
    }

    async fn get_by_id(&self, id: TodoId, cancel: &CancellationToken) -> Result<Todo, TodoError> {
        ensure_active(cancel)?;
        let store = self.store.read().await;
        store.todos.get(&id).cloned().ok_or(TodoError::NotFound)
    }

    async fn get_all(&self, cancel: &CancellationToken) -> Result<Vec<Todo>, TodoError> {
        ensure_active(cancel)?;
        let store = self.store.read().await;
        Ok(store.todos.values().cloned().collect())
    }

    async fn update(
        &self,
        id: TodoId,
        input: UpdateTodo,
        cancel: &CancellationToken,
    ) -> Result<Todo, TodoError> {
        ensure_active(cancel)?;
        let mut store = self.store.write().await;
        let todo = store.todos.get_mut(&id).ok_or(TodoError::NotFound)?;

        input.title.apply_to(&mut todo.title);
        input.description.apply_to(&mut todo.description);
        input.completed.apply_to(&mut todo.completed);
        // A clock stepping backwards must not break updated_at >= created_at.
        todo.updated_at = self.clock.now().max(todo.updated_at);

        debug!(id, "todo updated");
        Ok(todo.clone())
    }

    async fn delete(&self, id: TodoId, cancel: &CancellationToken) -> Result<(), TodoError> {
        ensure_active(cancel)?;
        let mut store = self.store.write().await;
        store
            .todos
            .remove(&id)
            .map(|_| debug!(id, "todo removed"))
            .ok_or(TodoError::NotFound)
    }

    async fn get_filtered(
        &self,
        filter: &TodoFilter,
        cancel: &CancellationToken,
    ) -> Result<Vec<Todo>, TodoError> {
        ensure_active(cancel)?;
        let matches = filter.matcher();
        let store = self.store.read().await;
        Ok(store.todos.values().filter(|todo| matches(todo)).cloned().collect())
    }
}
