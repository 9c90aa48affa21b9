//! Route handlers: decode the request, call the service under the request
//! deadline, encode the result.

use axum::{
    body::Body,
    extract::{rejection::QueryRejection, Query, State},
    http::{StatusCode, Uri},
    Json,
};
use todo_core::{CreateTodo, Todo, TodoFilter, TodoId, UpdateTodo};

use crate::error::ApiError;
use crate::state::AppState;

const ITEM_PREFIX: &str = "/todos/";

/// Query string accepted by `GET /todos`.
///
/// Parameters that are absent or empty count as "not given"; when neither is
/// given the unfiltered listing is used.
#[derive(Debug, Default)]
pub struct ListQuery {
    pub completed: Option<String>,
    pub search: Option<String>,
}

impl ListQuery {
    /// Pick the known keys out of decoded pairs. When a key repeats, its
    /// first value wins; unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "completed" => &mut query.completed,
                "search" => &mut query.search,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }

    pub fn into_filter(self) -> Option<TodoFilter> {
        let completed = self.completed.filter(|value| !value.is_empty());
        let search = self.search.filter(|value| !value.is_empty());
        if completed.is_none() && search.is_none() {
            return None;
        }
        Some(TodoFilter::new(
            completed.map(|value| value == "true"),
            search.unwrap_or_default(),
        ))
    }
}

/// Parse the id out of a `/todos/{id}` path, tolerating one trailing slash.
pub fn extract_id(path: &str) -> Result<TodoId, ApiError> {
    let rest = path.strip_prefix(ITEM_PREFIX).unwrap_or(path);
    let rest = rest.strip_suffix('/').unwrap_or(rest);
    if rest.is_empty() {
        return Err(ApiError::InvalidPath);
    }
    match rest.parse::<TodoId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::InvalidId),
    }
}

pub async fn list_todos(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let Query(pairs) = query.map_err(|_| ApiError::InvalidQuery)?;
    let todos = match ListQuery::from_pairs(pairs).into_filter() {
        Some(filter) => {
            state
                .run("get_filtered", move |service, cancel| async move {
                    service.get_filtered(filter, &cancel).await
                })
                .await?
        }
        None => {
            state
                .run("get_all", |service, cancel| async move {
                    service.get_all(&cancel).await
                })
                .await?
        }
    };
    Ok(Json(todos))
}

pub async fn create_todo(
    State(state): State<AppState>,
    body: Body,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let deadline = state.deadline();
    let input: CreateTodo = state.read_body("create", deadline, body).await?;
    let todo = state
        .run_until("create", deadline, move |service, cancel| async move {
            service.create(input, &cancel).await
        })
        .await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn get_todo(State(state): State<AppState>, uri: Uri) -> Result<Json<Todo>, ApiError> {
    let id = extract_id(uri.path())?;
    let todo = state
        .run("get_by_id", move |service, cancel| async move {
            service.get_by_id(id, &cancel).await
        })
        .await?;
    Ok(Json(todo))
}

pub async fn update_todo(
    State(state): State<AppState>,
    uri: Uri,
    body: Body,
) -> Result<Json<Todo>, ApiError> {
    let deadline = state.deadline();
    let id = extract_id(uri.path())?;
    let input: UpdateTodo = state.read_body("update", deadline, body).await?;
    let todo = state
        .run_until("update", deadline, move |service, cancel| async move {
            service.update(id, input, &cancel).await
        })
        .await?;
    Ok(Json(todo))
}

pub async fn delete_todo(State(state): State<AppState>, uri: Uri) -> Result<StatusCode, ApiError> {
    let id = extract_id(uri.path())?;
    state
        .run("delete", move |service, cancel| async move {
            service.delete(id, &cancel).await
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `/todos/` with nothing after the prefix, for any method.
pub async fn missing_id() -> ApiError {
    ApiError::InvalidPath
}

/// Unsupported method on `/todos/{id}`. A bad id still wins over the method.
pub async fn item_method_not_allowed(uri: Uri) -> ApiError {
    match extract_id(uri.path()) {
        Ok(_) => ApiError::MethodNotAllowed,
        Err(err) => err,
    }
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

/// Liveness only; never touches the service.
pub async fn health() -> StatusCode {
    StatusCode::OK
}
