//! Task model and database operations
//!
//! Tasks sit in a column at a 1-based `position` that is contiguous among the
//! column's live tasks. Position and column changes go through
//! [`crate::ordering`]; the helpers here only insert rows and edit the other
//! fields.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE tasks (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     column_id UUID NOT NULL REFERENCES board_columns (id),
//!     title VARCHAR(100) NOT NULL,
//!     description TEXT NOT NULL DEFAULT '',
//!     position INTEGER NOT NULL CHECK (position >= 1),
//!     assignee_id UUID REFERENCES users (id),
//!     due_date DATE,
//!     estimated_time INTEGER,        -- minutes
//!     actual_time INTEGER,           -- minutes, derived from timer sessions
//!     is_completed BOOLEAN NOT NULL DEFAULT FALSE,
//!     completed_at TIMESTAMPTZ,
//!     scheduled_start TIMESTAMPTZ,
//!     scheduled_end TIMESTAMPTZ,
//!     calendar_date DATE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     deleted_at TIMESTAMPTZ
//! );
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::calendar::check_window;
use super::patch::{double_option, presence};

const TASK_COLUMNS: &str = "id, column_id, title, description, position, assignee_id, due_date, \
     estimated_time, actual_time, is_completed, completed_at, scheduled_start, scheduled_end, \
     calendar_date, created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,
    pub column_id: Uuid,
    pub title: String,
    pub description: String,

    #[serde(rename = "order")]
    pub position: i32,

    pub assignee_id: Option<Uuid>,
    pub due_date: Option<NaiveDate>,

    /// Minutes
    pub estimated_time: Option<i32>,

    /// Minutes, summed from finished timer sessions
    pub actual_time: Option<i32>,

    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub scheduled_start: Option<DateTime<Utc>>,
    pub scheduled_end: Option<DateTime<Utc>>,
    pub calendar_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
///
/// Without `order` the task is appended to the column.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTask {
    pub column_id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[validate(range(min = 1, message = "Order must be at least 1"))]
    pub order: Option<i32>,

    pub assignee_id: Option<Uuid>,
    pub due_date: Option<NaiveDate>,

    #[validate(range(min = 0, message = "Estimated time cannot be negative"))]
    pub estimated_time: Option<i32>,
}

/// Partial update for a task
///
/// Nullable fields distinguish "absent" from `null`; see
/// [`super::patch`].
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[validate(schema(function = "validate_task_patch"))]
pub struct TaskPatch {
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: Option<String>,

    pub description: Option<String>,

    /// New position within the current column
    #[validate(range(min = 1, message = "Order must be at least 1"))]
    pub order: Option<i32>,

    #[serde(default, deserialize_with = "double_option")]
    pub assignee_id: Option<Option<Uuid>>,

    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<NaiveDate>>,

    #[serde(default, deserialize_with = "double_option")]
    pub estimated_time: Option<Option<i32>>,

    pub is_completed: Option<bool>,

    /// `null` unschedules the task
    #[serde(default, deserialize_with = "double_option")]
    pub scheduled_start: Option<Option<DateTime<Utc>>>,

    #[serde(default, deserialize_with = "double_option")]
    pub scheduled_end: Option<Option<DateTime<Utc>>>,

    #[serde(default, deserialize_with = "double_option")]
    pub calendar_date: Option<Option<NaiveDate>>,
}

fn validate_task_patch(patch: &TaskPatch) -> Result<(), ValidationError> {
    if let Some(Some(minutes)) = patch.estimated_time {
        if minutes < 0 {
            let mut err = ValidationError::new("range");
            err.message = Some("Estimated time cannot be negative".into());
            return Err(err);
        }
    }
    if let (Some(Some(start)), Some(Some(end))) = (patch.scheduled_start, patch.scheduled_end) {
        check_window(start, end)?;
    }
    Ok(())
}

impl TaskPatch {
    /// True when the patch touches fields other than `order`
    pub fn has_field_changes(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.assignee_id.is_some()
            || self.due_date.is_some()
            || self.estimated_time.is_some()
            || self.is_completed.is_some()
            || self.scheduled_start.is_some()
            || self.scheduled_end.is_some()
            || self.calendar_date.is_some()
    }
}

/// Move a task to another column (or position)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MoveTask {
    pub new_column_id: Uuid,

    #[validate(range(min = 1, message = "Order must be at least 1"))]
    pub new_order: i32,
}

impl Task {
    pub async fn insert<'e, E: PgExecutor<'e>>(
        executor: E,
        data: &CreateTask,
        position: i32,
    ) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO tasks (column_id, title, description, position, assignee_id, due_date, \
             estimated_time) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {TASK_COLUMNS}"
        );

        sqlx::query_as::<_, Task>(&sql)
            .bind(data.column_id)
            .bind(&data.title)
            .bind(&data.description)
            .bind(position)
            .bind(data.assignee_id)
            .bind(data.due_date)
            .bind(data.estimated_time)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND deleted_at IS NULL");

        sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Live tasks of a column in order
    pub async fn list_by_column<'e, E: PgExecutor<'e>>(
        executor: E,
        column_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE column_id = $1 AND deleted_at IS NULL \
             ORDER BY position"
        );

        sqlx::query_as::<_, Task>(&sql)
            .bind(column_id)
            .fetch_all(executor)
            .await
    }

    /// Live tasks of several columns, grouped by column then ordered
    pub async fn list_by_columns<'e, E: PgExecutor<'e>>(
        executor: E,
        column_ids: &[Uuid],
    ) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE column_id = ANY($1) AND deleted_at IS NULL \
             ORDER BY column_id, position"
        );

        sqlx::query_as::<_, Task>(&sql)
            .bind(column_ids)
            .fetch_all(executor)
            .await
    }

    /// Applies every field of `patch` except `order`
    ///
    /// `completed_at` is stamped when the task becomes completed and cleared
    /// when it is reopened.
    pub async fn update<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        patch: &TaskPatch,
    ) -> Result<Option<Self>, sqlx::Error> {
        let (set_assignee, assignee) = presence(&patch.assignee_id);
        let (set_due, due_date) = presence(&patch.due_date);
        let (set_estimate, estimate) = presence(&patch.estimated_time);
        let (set_start, scheduled_start) = presence(&patch.scheduled_start);
        let (set_end, scheduled_end) = presence(&patch.scheduled_end);
        let (set_date, calendar_date) = presence(&patch.calendar_date);

        let sql = format!(
            r#"
            UPDATE tasks SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                assignee_id = CASE WHEN $4::BOOLEAN THEN $5 ELSE assignee_id END,
                due_date = CASE WHEN $6::BOOLEAN THEN $7 ELSE due_date END,
                estimated_time = CASE WHEN $8::BOOLEAN THEN $9 ELSE estimated_time END,
                is_completed = COALESCE($10, is_completed),
                completed_at = CASE
                    WHEN $10::BOOLEAN IS NULL THEN completed_at
                    WHEN $10::BOOLEAN AND NOT is_completed THEN NOW()
                    WHEN $10::BOOLEAN THEN completed_at
                    ELSE NULL
                END,
                scheduled_start = CASE WHEN $11::BOOLEAN THEN $12 ELSE scheduled_start END,
                scheduled_end = CASE WHEN $13::BOOLEAN THEN $14 ELSE scheduled_end END,
                calendar_date = CASE WHEN $15::BOOLEAN THEN $16 ELSE calendar_date END,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {TASK_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(patch.title.as_deref())
            .bind(patch.description.as_deref())
            .bind(set_assignee)
            .bind(assignee)
            .bind(set_due)
            .bind(due_date)
            .bind(set_estimate)
            .bind(estimate)
            .bind(patch.is_completed)
            .bind(set_start)
            .bind(scheduled_start)
            .bind(set_end)
            .bind(scheduled_end)
            .bind(set_date)
            .bind(calendar_date)
            .fetch_optional(executor)
            .await
    }

    /// Sets the schedule window; the calendar date follows the start
    pub async fn set_schedule<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "UPDATE tasks SET scheduled_start = $2, scheduled_end = $3, calendar_date = $4, \
             updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL RETURNING {TASK_COLUMNS}"
        );

        sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(start)
            .bind(end)
            .bind(start.date_naive())
            .fetch_optional(executor)
            .await
    }

    /// Recomputes `actual_time` (minutes) from the task's finished timer
    /// sessions
    pub async fn refresh_actual_time<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            UPDATE tasks SET
                actual_time = (
                    SELECT (COALESCE(SUM(duration), 0) / 60)::INT4
                    FROM timer_sessions
                    WHERE task_id = $1 AND NOT is_active
                ),
                updated_at = NOW()
            WHERE id = $1
            RETURNING actual_time
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
        .map(Option::flatten)
    }
}
