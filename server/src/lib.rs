//! HTTP front end for the todo service.
//!
//! # Overview
//! Maps `/todos` requests onto `todo_core::TodoService`, decodes JSON bodies
//! with strict rules, and translates domain errors into status codes. The
//! composition root (`app`, or `main` for the binary) wires an in-memory
//! repository into the service and the service into `AppState`.
//!
//! # Design
//! - Routing uses axum method routers; each `/todos` route carries a
//!   fallback so unsupported methods get a JSON 405 instead of an empty one.
//! - `/todos/{id}` is a catch-all so the id is parsed by `extract_id` with
//!   the same rules for every method, trailing slash included.
//! - Each handler runs under one per-request deadline covering the body read
//!   and the service call (`AppState::deadline`).
//! - Access logging wraps only the `/todos` routes; `/health` stays quiet.

pub mod body;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod state;
pub mod telemetry;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;
use todo_core::{DefaultTodoService, InMemoryTodoRepository};

pub use config::Config;
pub use error::{ApiError, ErrorBody};
pub use state::{AppState, DEFAULT_REQUEST_TIMEOUT};

/// Router over the given state.
pub fn router(state: AppState) -> Router {
    let todos = Router::new()
        .route(
            "/todos",
            get(handlers::list_todos)
                .post(handlers::create_todo)
                .fallback(handlers::method_not_allowed),
        )
        .route("/todos/", any(handlers::missing_id))
        .route(
            "/todos/{*id}",
            get(handlers::get_todo)
                .put(handlers::update_todo)
                .delete(handlers::delete_todo)
                .fallback(handlers::item_method_not_allowed),
        )
        .layer(middleware::from_fn(logging::log_requests));

    Router::new()
        .merge(todos)
        .route(
            "/health",
            get(handlers::health).fallback(handlers::method_not_allowed),
        )
        .fallback(handlers::route_not_found)
        .with_state(state)
}

/// Fresh in-memory store behind the default service and timeout.
pub fn app() -> Router {
    app_with_timeout(DEFAULT_REQUEST_TIMEOUT)
}

pub fn app_with_timeout(request_timeout: Duration) -> Router {
    let repository = Arc::new(InMemoryTodoRepository::new());
    let service = Arc::new(DefaultTodoService::new(repository));
    router(AppState::new(service, request_timeout))
}

/// Serve `app` on `listener` until `shutdown` resolves, then drain.
pub async fn run<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}
