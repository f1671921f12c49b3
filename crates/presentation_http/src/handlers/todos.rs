//! Todo item handlers
//!
//! CRUD endpoints under `/todoitems`. Absence is reported as a bare 404.

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use domain::{Todo, TodoDraft, TodoId};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::{error::ApiError, state::AppState};

/// Todo item as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({"id": 1, "name": "Buy milk", "isComplete": false}))]
pub struct TodoResponse {
    /// Identifier assigned on creation
    pub id: i64,
    /// Free-form name
    pub name: Option<String>,
    /// Completion flag
    pub is_complete: bool,
}

impl From<Todo> for TodoResponse {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id.value(),
            name: todo.name,
            is_complete: todo.is_complete,
        }
    }
}

/// Create or update request body
///
/// An `id` in the body is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({"name": "Buy milk", "isComplete": false}))]
pub struct TodoRequest {
    /// Free-form name
    #[serde(default)]
    pub name: Option<String>,
    /// Completion flag, false when omitted
    #[serde(default)]
    pub is_complete: bool,
}

impl From<TodoRequest> for TodoDraft {
    fn from(request: TodoRequest) -> Self {
        Self {
            name: request.name,
            is_complete: request.is_complete,
        }
    }
}

fn location(id: TodoId) -> String {
    format!("/todoitems/{id}")
}

/// List all todo items
///
/// GET /todoitems
#[utoipa::path(
    get,
    path = "/todoitems",
    tag = "todoitems",
    responses(
        (status = 200, description = "All todo items", body = Vec<TodoResponse>),
        (status = 500, description = "Store failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_todos(
    State(state): State<AppState>,
) -> Result<Json<Vec<TodoResponse>>, ApiError> {
    info!("Get all todo items");
    let todos = state.todos.list_all().await?;
    Ok(Json(todos.into_iter().map(TodoResponse::from).collect()))
}

/// List completed todo items
///
/// GET /todoitems/complete
#[utoipa::path(
    get,
    path = "/todoitems/complete",
    tag = "todoitems",
    responses(
        (status = 200, description = "Todo items marked complete", body = Vec<TodoResponse>),
        (status = 500, description = "Store failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_completed_todos(
    State(state): State<AppState>,
) -> Result<Json<Vec<TodoResponse>>, ApiError> {
    info!("Get completed todo items");
    let todos = state.todos.list_completed().await?;
    Ok(Json(todos.into_iter().map(TodoResponse::from).collect()))
}

/// Get a todo item by id
///
/// GET /todoitems/{id}
#[utoipa::path(
    get,
    path = "/todoitems/{id}",
    tag = "todoitems",
    params(
        ("id" = i64, Path, description = "Todo item id")
    ),
    responses(
        (status = 200, description = "The todo item", body = TodoResponse),
        (status = 404, description = "No todo item with this id"),
        (status = 500, description = "Store failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<TodoId>,
) -> Result<Json<TodoResponse>, ApiError> {
    info!(%id, "Get a todo item by id");
    state
        .todos
        .get(id)
        .await?
        .map(|todo| Json(TodoResponse::from(todo)))
        .ok_or(ApiError::NotFound)
}

/// Create a todo item
///
/// POST /todoitems
#[utoipa::path(
    post,
    path = "/todoitems",
    tag = "todoitems",
    request_body = TodoRequest,
    responses(
        (status = 201, description = "Todo item created", body = TodoResponse,
            headers(("Location" = String, description = "URL of the new todo item"))),
        (status = 500, description = "Store failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_todo(
    State(state): State<AppState>,
    Json(request): Json<TodoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Add a todo item");
    let todo = state.todos.create(request.into()).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location(todo.id))],
        Json(TodoResponse::from(todo)),
    ))
}

/// Replace name and completion flag of a todo item
///
/// PUT /todoitems/{id}
#[utoipa::path(
    put,
    path = "/todoitems/{id}",
    tag = "todoitems",
    params(
        ("id" = i64, Path, description = "Todo item id")
    ),
    request_body = TodoRequest,
    responses(
        (status = 204, description = "Todo item updated"),
        (status = 404, description = "No todo item with this id"),
        (status = 500, description = "Store failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<TodoId>,
    Json(request): Json<TodoRequest>,
) -> Result<StatusCode, ApiError> {
    info!(%id, "Update a todo item");
    match state.todos.update(id, request.into()).await? {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(ApiError::NotFound),
    }
}

/// Delete a todo item
///
/// DELETE /todoitems/{id}
#[utoipa::path(
    delete,
    path = "/todoitems/{id}",
    tag = "todoitems",
    params(
        ("id" = i64, Path, description = "Todo item id")
    ),
    responses(
        (status = 204, description = "Todo item deleted"),
        (status = 404, description = "No todo item with this id"),
        (status = 500, description = "Store failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<TodoId>,
) -> Result<StatusCode, ApiError> {
    info!(%id, "Delete a todo item");
    match state.todos.delete(id).await? {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(ApiError::NotFound),
    }
}
