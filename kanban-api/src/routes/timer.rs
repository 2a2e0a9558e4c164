//! Task timer endpoints
//!
//! # Endpoints
//!
//! - `POST /v1/timer/start` - Start a timer on a task
//! - `PUT /v1/timer/:id/stop` - Stop a running timer
//! - `GET /v1/timer/active` - The caller's running timer
//! - `GET /v1/timer/history?limit=N` - Recent sessions, newest first
//! - `GET /v1/timer/tasks/:task_id` - Sessions of one task

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ValidatedJson,
};
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use kanban_shared::{
    auth::middleware::AuthContext,
    models::timer::{StartTimer, TimerSession},
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    /// Defaults to 100, capped at 500
    pub limit: Option<i64>,
}

/// Start a timer
///
/// # Endpoint
///
/// ```text
/// POST /v1/timer/start
/// Content-Type: application/json
///
/// { "task_id": "uuid", "duration": 1500 }
/// ```
///
/// `duration` is the planned length in seconds (optional).
///
/// # Response
///
/// `201 Created` with the running session.
///
/// # Errors
///
/// - `403 Forbidden`: Task belongs to another user
/// - `404 Not Found`: Task missing or deleted
/// - `409 Conflict`: A timer is already running
pub async fn start_timer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<StartTimer>,
) -> ApiResult<(StatusCode, Json<TimerSession>)> {
    let session = state.services.timer.start(auth.user_id, &req).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// Stop a timer
///
/// Records the elapsed seconds as `duration` and recomputes the task's
/// `actual_time` (minutes) from all finished sessions.
///
/// # Errors
///
/// - `403 Forbidden`: Session belongs to another user
/// - `409 Conflict`: Already stopped
pub async fn stop_timer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<TimerSession>> {
    Ok(Json(state.services.timer.stop(auth.user_id, session_id).await?))
}

/// `404 Not Found` when no timer is running
pub async fn active_timer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<TimerSession>> {
    state
        .services
        .timer
        .active(auth.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No active timer".to_string()))
}

pub async fn timer_history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<TimerSession>>> {
    let Query(query) = query?;

    Ok(Json(
        state
            .services
            .timer
            .history(auth.user_id, query.limit)
            .await?,
    ))
}

pub async fn task_timers(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TimerSession>>> {
    Ok(Json(
        state.services.timer.for_task(auth.user_id, task_id).await?,
    ))
}
