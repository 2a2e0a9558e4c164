//! Calendar events and per-user calendar settings
//!
//! Events belong to a user and may point at a task (task-based events are
//! created from a task's schedule). Settings are one row per user, created
//! with defaults on first read.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Color of events created by hand
pub const DEFAULT_EVENT_COLOR: &str = "#3B82F6";

/// Color of events derived from a task's schedule
pub const TASK_EVENT_COLOR: &str = "#10B981";

const EVENT_COLUMNS: &str =
    "id, user_id, task_id, title, start_time, end_time, color, is_task_based, created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CalendarEvent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub task_id: Option<Uuid>,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub color: String,
    pub is_task_based: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn validate_hex_color(color: &str) -> Result<(), ValidationError> {
    let digits = color.strip_prefix('#').unwrap_or("");
    if digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("color");
        err.message = Some("Color must look like #RRGGBB".into());
        Err(err)
    }
}

fn validate_event_window(event: &CreateEvent) -> Result<(), ValidationError> {
    check_window(event.start_time, event.end_time)
}

fn validate_event_patch(patch: &EventPatch) -> Result<(), ValidationError> {
    match (patch.start_time, patch.end_time) {
        (Some(start), Some(end)) => check_window(start, end),
        _ => Ok(()),
    }
}

fn validate_clock(value: &str) -> Result<(), ValidationError> {
    match NaiveTime::parse_from_str(value, "%H:%M") {
        Ok(_) if value.len() == 5 => Ok(()),
        _ => {
            let mut err = ValidationError::new("time");
            err.message = Some("Time must be HH:MM".into());
            Err(err)
        }
    }
}

/// Rejects windows that end before (or when) they start
pub fn check_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), ValidationError> {
    if end > start {
        Ok(())
    } else {
        let mut err = ValidationError::new("window");
        err.message = Some("End time must be after start time".into());
        Err(err)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_event_window"))]
pub struct CreateEvent {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[serde(alias = "start")]
    pub start_time: DateTime<Utc>,
    #[serde(alias = "end")]
    pub end_time: DateTime<Utc>,

    #[validate(custom(function = "validate_hex_color"))]
    pub color: Option<String>,

    pub task_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[validate(schema(function = "validate_event_patch"))]
pub struct EventPatch {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[serde(alias = "start")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(alias = "end")]
    pub end_time: Option<DateTime<Utc>>,

    #[validate(custom(function = "validate_hex_color"))]
    pub color: Option<String>,
}

/// Schedule window for a task
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_schedule"))]
pub struct TaskSchedule {
    #[serde(alias = "start")]
    pub start_time: DateTime<Utc>,
    #[serde(alias = "end")]
    pub end_time: DateTime<Utc>,
}

fn validate_schedule(schedule: &TaskSchedule) -> Result<(), ValidationError> {
    check_window(schedule.start_time, schedule.end_time)
}

impl CalendarEvent {
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: Uuid,
        data: &CreateEvent,
        is_task_based: bool,
    ) -> Result<Self, sqlx::Error> {
        let color = data.color.as_deref().unwrap_or(if is_task_based {
            TASK_EVENT_COLOR
        } else {
            DEFAULT_EVENT_COLOR
        });

        let sql = format!(
            "INSERT INTO calendar_events (user_id, task_id, title, start_time, end_time, color, \
             is_task_based) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {EVENT_COLUMNS}"
        );

        sqlx::query_as::<_, CalendarEvent>(&sql)
            .bind(user_id)
            .bind(data.task_id)
            .bind(&data.title)
            .bind(data.start_time)
            .bind(data.end_time)
            .bind(color)
            .bind(is_task_based)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM calendar_events WHERE id = $1 AND deleted_at IS NULL"
        );

        sqlx::query_as::<_, CalendarEvent>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Events of a user overlapping `[start, end)`
    pub async fn list_overlapping<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM calendar_events \
             WHERE user_id = $1 AND deleted_at IS NULL AND start_time < $3 AND end_time > $2 \
             ORDER BY start_time, id"
        );

        sqlx::query_as::<_, CalendarEvent>(&sql)
            .bind(user_id)
            .bind(start)
            .bind(end)
            .fetch_all(executor)
            .await
    }

    pub async fn update<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        patch: &EventPatch,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "UPDATE calendar_events SET title = COALESCE($2, title), \
             start_time = COALESCE($3, start_time), end_time = COALESCE($4, end_time), \
             color = COALESCE($5, color), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING {EVENT_COLUMNS}"
        );

        sqlx::query_as::<_, CalendarEvent>(&sql)
            .bind(id)
            .bind(patch.title.as_deref())
            .bind(patch.start_time)
            .bind(patch.end_time)
            .bind(patch.color.as_deref())
            .fetch_optional(executor)
            .await
    }

    /// Moves every live event derived from `task_id` to the new window
    pub async fn reschedule_for_task<'e, E: PgExecutor<'e>>(
        executor: E,
        task_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE calendar_events SET start_time = $2, end_time = $3, updated_at = NOW()
            WHERE task_id = $1 AND is_task_based AND deleted_at IS NULL
            "#,
        )
        .bind(task_id)
        .bind(start)
        .bind(end)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn soft_delete<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE calendar_events SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Display-window preferences for a user's calendar
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CalendarSettings {
    pub user_id: Uuid,
    pub weekday_start_time: String,
    pub weekday_end_time: String,
    pub weekend_start_time: String,
    pub weekend_end_time: String,

    /// Minutes per slot
    pub time_slot_duration: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SettingsPatch {
    #[validate(custom(function = "validate_clock"))]
    pub weekday_start_time: Option<String>,

    #[validate(custom(function = "validate_clock"))]
    pub weekday_end_time: Option<String>,

    #[validate(custom(function = "validate_clock"))]
    pub weekend_start_time: Option<String>,

    #[validate(custom(function = "validate_clock"))]
    pub weekend_end_time: Option<String>,

    #[validate(range(min = 5, max = 120, message = "Slot duration must be 5-120 minutes"))]
    pub time_slot_duration: Option<i32>,
}

const SETTINGS_COLUMNS: &str = "user_id, weekday_start_time, weekday_end_time, weekend_start_time, \
     weekend_end_time, time_slot_duration, created_at, updated_at";

impl CalendarSettings {
    /// Returns the user's settings, inserting the defaults first if needed
    pub async fn get_or_create<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let sql = format!(
            "INSERT INTO calendar_settings (user_id) VALUES ($1) \
             ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id \
             RETURNING {SETTINGS_COLUMNS}"
        );

        sqlx::query_as::<_, CalendarSettings>(&sql)
            .bind(user_id)
            .fetch_one(executor)
            .await
    }

    pub async fn update<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: Uuid,
        patch: &SettingsPatch,
    ) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO calendar_settings (user_id, weekday_start_time, weekday_end_time, \
             weekend_start_time, weekend_end_time, time_slot_duration) \
             VALUES ($1, COALESCE($2, '09:00'), COALESCE($3, '18:00'), COALESCE($4, '10:00'), \
             COALESCE($5, '16:00'), COALESCE($6, 10)) \
             ON CONFLICT (user_id) DO UPDATE SET \
             weekday_start_time = COALESCE($2, calendar_settings.weekday_start_time), \
             weekday_end_time = COALESCE($3, calendar_settings.weekday_end_time), \
             weekend_start_time = COALESCE($4, calendar_settings.weekend_start_time), \
             weekend_end_time = COALESCE($5, calendar_settings.weekend_end_time), \
             time_slot_duration = COALESCE($6, calendar_settings.time_slot_duration), \
             updated_at = NOW() \
             RETURNING {SETTINGS_COLUMNS}"
        );

        sqlx::query_as::<_, CalendarSettings>(&sql)
            .bind(user_id)
            .bind(patch.weekday_start_time.as_deref())
            .bind(patch.weekday_end_time.as_deref())
            .bind(patch.weekend_start_time.as_deref())
            .bind(patch.weekend_end_time.as_deref())
            .bind(patch.time_slot_duration)
            .fetch_one(executor)
            .await
    }
}
