//! REST handlers for tasks and categories.
//!
//! JSON in, JSON out. Errors surface as (StatusCode, String) pairs:
//! store failures map to 500, absent entities to 404, bad category
//! input to 422. The client's effect layer turns any non-success
//! status into a failure action.

use crate::models::{
    Category, CategoryInput, CreateTaskRequest, CreatedTask, SetDueDateRequest, Task,
};
use crate::store::{Store, StoreError};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, put},
    Json, Router,
};
use std::sync::Arc;

pub struct AppState {
    pub store: Store,
}

pub type SharedState = Arc<AppState>;

/// All API routes. The binary layers CORS and the static fallback on top.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/:id", get(get_task).delete(delete_task))
        .route("/api/tasks/:id/due-date", patch(set_due_date))
        .route("/api/tasks/:id/complete", patch(toggle_complete))
        .route("/api/categories", get(list_categories).post(create_category))
        .route(
            "/api/categories/:id",
            put(update_category).delete(delete_category),
        )
        .with_state(state)
}

fn internal(e: StoreError) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

// ── Task handlers ──────────────────────────────────────────────

// GET /api/tasks
async fn list_tasks(
    State(state): State<SharedState>,
) -> Result<Json<Vec<Task>>, (StatusCode, String)> {
    let tasks = state.store.list_tasks().map_err(internal)?;
    Ok(Json(tasks))
}

// GET /api/tasks/:id
async fn get_task(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
) -> Result<Json<Task>, (StatusCode, String)> {
    let task = state
        .store
        .get_task(id)
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Task not found".to_string()))?;
    Ok(Json(task))
}

// POST /api/tasks
async fn create_task(
    State(state): State<SharedState>,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<CreatedTask>), (StatusCode, String)> {
    let task = state
        .store
        .add_task(payload.description)
        .map_err(internal)?;

    tracing::debug!(id = task.id, "task created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedTask {
            id: task.id,
            description: task.description,
        }),
    ))
}

// DELETE /api/tasks/:id
async fn delete_task(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, (StatusCode, String)> {
    let deleted = state.store.delete_task(id).map_err(internal)?;
    if !deleted {
        return Err((StatusCode::NOT_FOUND, "Task not found".to_string()));
    }
    tracing::debug!(id, "task deleted");
    Ok(StatusCode::NO_CONTENT)
}

// PATCH /api/tasks/:id/due-date
async fn set_due_date(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
    Json(payload): Json<SetDueDateRequest>,
) -> Result<Json<Task>, (StatusCode, String)> {
    let task = state
        .store
        .set_due_date(id, payload.due_date)
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Task not found".to_string()))?;
    Ok(Json(task))
}

// PATCH /api/tasks/:id/complete
async fn toggle_complete(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
) -> Result<Json<Task>, (StatusCode, String)> {
    let task = state
        .store
        .toggle_complete(id)
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Task not found".to_string()))?;
    Ok(Json(task))
}

// ── Category handlers ──────────────────────────────────────────

// GET /api/categories
async fn list_categories(
    State(state): State<SharedState>,
) -> Result<Json<Vec<Category>>, (StatusCode, String)> {
    let categories = state.store.list_categories().map_err(internal)?;
    Ok(Json(categories))
}

// POST /api/categories
async fn create_category(
    State(state): State<SharedState>,
    Json(payload): Json<CategoryInput>,
) -> Result<(StatusCode, Json<Category>), (StatusCode, String)> {
    payload
        .validate()
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

    let category = state.store.create_category(&payload).map_err(internal)?;
    tracing::debug!(id = category.id, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

// PUT /api/categories/:id
async fn update_category(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
    Json(payload): Json<CategoryInput>,
) -> Result<Json<Category>, (StatusCode, String)> {
    payload
        .validate()
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

    let category = state
        .store
        .update_category(id, &payload)
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Category not found".to_string()))?;
    Ok(Json(category))
}

// DELETE /api/categories/:id
async fn delete_category(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, (StatusCode, String)> {
    let deleted = state.store.delete_category(id).map_err(internal)?;
    if !deleted {
        return Err((StatusCode::NOT_FOUND, "Category not found".to_string()));
    }
    tracing::debug!(id, "category deleted");
    Ok(StatusCode::NO_CONTENT)
}
