//! Domain core for the todo service.
//!
//! # Overview
//! Holds everything below the HTTP boundary: the `Todo` entity and its input
//! shapes, the validation rules, the storage contract with its in-memory
//! implementation, and the service that normalizes input before it reaches
//! storage.
//!
//! # Design
//! - `TodoRepository` and `TodoService` are object-safe async traits so the
//!   server can hold `Arc<dyn _>` and tests can swap in their own variants.
//! - Every operation takes a `CancellationToken`; the caller decides when a
//!   request is abandoned, storage checks the token before taking its lock.
//! - Records leave the repository as owned clones, never as references into
//!   the store.

pub mod clock;
pub mod error;
pub mod repository;
pub mod service;
pub mod types;
pub mod validation;

pub use clock::{Clock, SystemClock};
pub use error::TodoError;
pub use repository::{InMemoryTodoRepository, TodoRepository};
pub use service::{DefaultTodoService, TodoService};
pub use types::{CreateTodo, Field, Todo, TodoFilter, TodoId, UpdateTodo};

pub use tokio_util::sync::CancellationToken;
