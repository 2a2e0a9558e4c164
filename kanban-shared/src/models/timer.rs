//! Timer session model
//!
//! A session records time spent on a task. While running, `duration` holds
//! the planned length in seconds supplied at start (0 when none); stopping
//! replaces it with the measured length. A partial unique index keeps at
//! most one active session per user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;
use validator::Validate;

const SESSION_COLUMNS: &str =
    "id, task_id, user_id, start_time, end_time, duration, is_active, created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TimerSession {
    pub id: Uuid,
    pub task_id: Uuid,
    pub user_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,

    /// Seconds
    pub duration: i32,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StartTimer {
    pub task_id: Uuid,

    /// Planned length in seconds
    #[serde(default)]
    #[validate(range(min = 0, message = "Duration cannot be negative"))]
    pub duration: i32,
}

/// Whole seconds between `start` and `end`, never negative
pub fn elapsed_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> i32 {
    (end - start).num_seconds().clamp(0, i32::MAX as i64) as i32
}

impl TimerSession {
    pub async fn start<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: Uuid,
        task_id: Uuid,
        planned_seconds: i32,
    ) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO timer_sessions (task_id, user_id, start_time, duration, is_active) \
             VALUES ($1, $2, NOW(), $3, TRUE) RETURNING {SESSION_COLUMNS}"
        );

        sqlx::query_as::<_, TimerSession>(&sql)
            .bind(task_id)
            .bind(user_id)
            .bind(planned_seconds)
            .fetch_one(executor)
            .await
    }

    /// Locks and returns a session
    pub async fn find_for_update<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM timer_sessions WHERE id = $1 FOR UPDATE");

        sqlx::query_as::<_, TimerSession>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_active<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM timer_sessions WHERE user_id = $1 AND is_active"
        );

        sqlx::query_as::<_, TimerSession>(&sql)
            .bind(user_id)
            .fetch_optional(executor)
            .await
    }

    pub async fn finish<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        end_time: DateTime<Utc>,
        duration: i32,
    ) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "UPDATE timer_sessions SET end_time = $2, duration = $3, is_active = FALSE, \
             updated_at = NOW() WHERE id = $1 RETURNING {SESSION_COLUMNS}"
        );

        sqlx::query_as::<_, TimerSession>(&sql)
            .bind(id)
            .bind(end_time)
            .bind(duration)
            .fetch_one(executor)
            .await
    }

    /// A user's sessions, newest first
    pub async fn list_by_user<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM timer_sessions WHERE user_id = $1 \
             ORDER BY created_at DESC LIMIT $2"
        );

        sqlx::query_as::<_, TimerSession>(&sql)
            .bind(user_id)
            .bind(limit)
            .fetch_all(executor)
            .await
    }

    /// A task's sessions, newest first
    pub async fn list_by_task<'e, E: PgExecutor<'e>>(
        executor: E,
        task_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM timer_sessions WHERE task_id = $1 \
             ORDER BY created_at DESC"
        );

        sqlx::query_as::<_, TimerSession>(&sql)
            .bind(task_id)
            .fetch_all(executor)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_elapsed_seconds() {
        let start = Utc::now();
        assert_eq!(elapsed_seconds(start, start + Duration::seconds(90)), 90);
        assert_eq!(elapsed_seconds(start, start), 0);
        assert_eq!(elapsed_seconds(start, start - Duration::seconds(5)), 0);
    }

    #[test]
    fn test_start_timer_defaults_duration() {
        let request: StartTimer =
            serde_json::from_value(serde_json::json!({ "task_id": Uuid::nil() })).unwrap();
        assert_eq!(request.duration, 0);
        assert!(request.validate().is_ok());
    }
}
