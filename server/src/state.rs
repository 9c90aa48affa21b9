//! Shared state handed to every handler.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use serde::de::DeserializeOwned;
use tokio::time::{timeout_at, Instant};
use todo_core::{CancellationToken, TodoError, TodoService};

use crate::body::read_json;
use crate::error::ApiError;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<dyn TodoService>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(service: Arc<dyn TodoService>, request_timeout: Duration) -> Self {
        Self {
            service,
            request_timeout,
        }
    }

    /// Instant by which the current request must be answered.
    pub fn deadline(&self) -> Instant {
        Instant::now() + self.request_timeout
    }

    /// Read and decode a JSON body, giving up at `deadline`.
    pub async fn read_body<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        deadline: Instant,
        body: Body,
    ) -> Result<T, ApiError> {
        match timeout_at(deadline, read_json(body)).await {
            Ok(decoded) => Ok(decoded?),
            Err(_) => Err(ApiError::Timeout { operation }),
        }
    }

    /// Run a service call under a fresh request deadline.
    pub async fn run<T, F, Fut>(&self, operation: &'static str, call: F) -> Result<T, ApiError>
    where
        F: FnOnce(Arc<dyn TodoService>, CancellationToken) -> Fut + Send,
        Fut: Future<Output = Result<T, TodoError>> + Send + 'static,
        T: Send + 'static,
    {
        self.run_until(operation, self.deadline(), call).await
    }

    /// Run a service call that must finish by `deadline`.
    ///
    /// The call is spawned so that, once the deadline passes, the handler
    /// can answer immediately. The token given to the call is cancelled as
    /// soon as this returns or is dropped, so an abandoned call stops at its
    /// next cancellation check.
    pub async fn run_until<T, F, Fut>(
        &self,
        operation: &'static str,
        deadline: Instant,
        call: F,
    ) -> Result<T, ApiError>
    where
        F: FnOnce(Arc<dyn TodoService>, CancellationToken) -> Fut + Send,
        Fut: Future<Output = Result<T, TodoError>> + Send + 'static,
        T: Send + 'static,
    {
        let cancel = CancellationToken::new();
        let _cancel_on_exit = cancel.clone().drop_guard();
        let task = tokio::spawn(call(Arc::clone(&self.service), cancel.clone()));

        match timeout_at(deadline, task).await {
            Ok(Ok(result)) => result.map_err(|err| ApiError::from_service(operation, err)),
            Ok(Err(join_err)) => Err(ApiError::Internal {
                operation,
                detail: join_err.to_string(),
            }),
            Err(_) => Err(ApiError::Timeout { operation }),
        }
    }
}
