//! Task endpoints
//!
//! # Endpoints
//!
//! - `POST /v1/tasks` - Create in a column
//! - `GET /v1/tasks/:id` - Fetch
//! - `PUT /v1/tasks/:id` - Partial update; `order` moves within the column
//! - `DELETE /v1/tasks/:id` - Delete and close the gap
//! - `PUT /v1/tasks/:id/move` - Move to another column (or position)
//! - `PUT /v1/columns/:id/tasks/reorder` - Reorder every task of a column

use crate::{app::AppState, error::ApiResult, extract::ValidatedJson};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use kanban_shared::{
    auth::middleware::AuthContext,
    models::task::{CreateTask, MoveTask, Task, TaskPatch},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct ReorderTasksRequest {
    pub task_ids: Vec<Uuid>,
}

/// Create a task
///
/// # Endpoint
///
/// ```text
/// POST /v1/tasks
/// Content-Type: application/json
///
/// {
///   "column_id": "uuid",
///   "title": "Write release notes",
///   "description": "",
///   "order": 1,
///   "due_date": "2025-03-01",
///   "estimated_time": 90
/// }
/// ```
///
/// # Response
///
/// `201 Created` with the task.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or unknown assignee
/// - `403 Forbidden`: Column's board belongs to another user
/// - `404 Not Found`: Column missing or deleted
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<CreateTask>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = state.services.tasks.create(auth.user_id, &req).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    Ok(Json(state.services.tasks.get(auth.user_id, task_id).await?))
}

/// Update a task
///
/// Absent fields are left alone; `null` clears `assignee_id`, `due_date`
/// and `estimated_time`. Setting `is_completed` stamps or clears
/// `completed_at`.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    ValidatedJson(patch): ValidatedJson<TaskPatch>,
) -> ApiResult<Json<Task>> {
    Ok(Json(
        state
            .services
            .tasks
            .update(auth.user_id, task_id, &patch)
            .await?,
    ))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.tasks.delete(auth.user_id, task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Move a task
///
/// # Endpoint
///
/// ```text
/// PUT /v1/tasks/:id/move
/// Content-Type: application/json
///
/// { "new_column_id": "uuid", "new_order": 1 }
/// ```
///
/// The source column closes its gap and the destination opens one, in the
/// same transaction. `new_order` past the end of the destination appends.
///
/// # Errors
///
/// - `400 Bad Request`: `new_order` < 1
/// - `403 Forbidden`: Task or destination column belongs to another user
/// - `404 Not Found`: Task or destination column missing
pub async fn move_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<MoveTask>,
) -> ApiResult<Json<Task>> {
    Ok(Json(
        state
            .services
            .tasks
            .move_task(auth.user_id, task_id, &req)
            .await?,
    ))
}

/// Reorder tasks
///
/// ```text
/// PUT /v1/columns/:id/tasks/reorder
///
/// { "task_ids": ["uuid-3", "uuid-1", "uuid-2"] }
/// ```
///
/// Same rules as column reordering: omitted tasks follow the listed ones in
/// their previous order.
pub async fn reorder_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(column_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<ReorderTasksRequest>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(
        state
            .services
            .tasks
            .reorder(auth.user_id, column_id, &req.task_ids)
            .await?,
    ))
}
