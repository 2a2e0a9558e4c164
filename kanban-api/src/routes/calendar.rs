//! Calendar endpoints
//!
//! # Endpoints
//!
//! - `GET /v1/calendar/settings` - Working hours and slot size (created on first read)
//! - `PUT /v1/calendar/settings` - Partial update
//! - `GET /v1/calendar/events?start=..&end=..` - Events overlapping a window
//! - `POST /v1/calendar/events` - Create a free-standing event
//! - `PUT /v1/calendar/events/:id` - Partial update
//! - `DELETE /v1/calendar/events/:id` - Delete
//! - `POST /v1/calendar/tasks/:task_id/events` - Schedule a task as an event
//! - `PUT /v1/calendar/tasks/:task_id/schedule` - Move a task's schedule

use crate::{app::AppState, error::ApiResult, extract::ValidatedJson};
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use kanban_shared::{
    auth::middleware::AuthContext,
    models::{
        calendar::{
            CalendarEvent, CalendarSettings, CreateEvent, EventPatch, SettingsPatch, TaskSchedule,
        },
        task::Task,
    },
};
use serde::Deserialize;
use uuid::Uuid;

/// RFC 3339 window, e.g. `?start=2025-03-01T00:00:00Z&end=2025-04-01T00:00:00Z`
#[derive(Debug, Deserialize)]
pub struct EventRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

pub async fn get_settings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<CalendarSettings>> {
    Ok(Json(state.services.calendar.settings(auth.user_id).await?))
}

/// Update calendar settings
///
/// ```text
/// PUT /v1/calendar/settings
///
/// { "weekday_start_time": "08:30", "time_slot_duration": 15 }
/// ```
///
/// Times are `HH:MM`; slot duration is 5-120 minutes.
pub async fn update_settings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(patch): ValidatedJson<SettingsPatch>,
) -> ApiResult<Json<CalendarSettings>> {
    Ok(Json(
        state
            .services
            .calendar
            .update_settings(auth.user_id, &patch)
            .await?,
    ))
}

/// List events
///
/// # Errors
///
/// - `400 Bad Request`: Missing or unparsable bounds, or `end` <= `start`
pub async fn list_events(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    range: Result<Query<EventRange>, QueryRejection>,
) -> ApiResult<Json<Vec<CalendarEvent>>> {
    let Query(range) = range?;

    Ok(Json(
        state
            .services
            .calendar
            .events_between(auth.user_id, range.start, range.end)
            .await?,
    ))
}

/// Create an event
///
/// # Endpoint
///
/// ```text
/// POST /v1/calendar/events
/// Content-Type: application/json
///
/// {
///   "title": "Planning",
///   "start_time": "2025-03-03T09:00:00Z",
///   "end_time": "2025-03-03T10:00:00Z",
///   "color": "#3b82f6"
/// }
/// ```
///
/// A `task_id` links the event to one of the caller's tasks.
///
/// # Response
///
/// `201 Created` with the event.
pub async fn create_event(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<CreateEvent>,
) -> ApiResult<(StatusCode, Json<CalendarEvent>)> {
    let event = state.services.calendar.create_event(auth.user_id, &req).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update_event(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(event_id): Path<Uuid>,
    ValidatedJson(patch): ValidatedJson<EventPatch>,
) -> ApiResult<Json<CalendarEvent>> {
    Ok(Json(
        state
            .services
            .calendar
            .update_event(auth.user_id, event_id, &patch)
            .await?,
    ))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(event_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.calendar.delete_event(auth.user_id, event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Schedule a task
///
/// ```text
/// POST /v1/calendar/tasks/:task_id/events
///
/// { "start_time": "2025-03-03T13:00:00Z", "end_time": "2025-03-03T15:00:00Z" }
/// ```
///
/// Stores the window on the task and creates a task-based event titled
/// after it. `201 Created` with the event.
pub async fn create_event_from_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    ValidatedJson(schedule): ValidatedJson<TaskSchedule>,
) -> ApiResult<(StatusCode, Json<CalendarEvent>)> {
    let event = state
        .services
        .calendar
        .create_event_from_task(auth.user_id, task_id, &schedule)
        .await?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// Moves the task's schedule and its task-based events; returns the task
pub async fn update_task_schedule(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    ValidatedJson(schedule): ValidatedJson<TaskSchedule>,
) -> ApiResult<Json<Task>> {
    Ok(Json(
        state
            .services
            .calendar
            .update_task_schedule(auth.user_id, task_id, &schedule)
            .await?,
    ))
}
