//! Task timers
//!
//! A user runs at most one timer at a time. Stopping a timer records its
//! measured duration and recomputes the task's `actual_time`.
use chrono::Utc;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::ServiceError;
use crate::auth::ownership::{require_owner, require_task};
use crate::models::task::Task;
use crate::models::timer::{elapsed_seconds, StartTimer, TimerSession};

/// Sessions returned by `history` when no limit is given
pub const DEFAULT_HISTORY_LIMIT: i64 = 100;

/// Upper bound for `history` limits
pub const MAX_HISTORY_LIMIT: i64 = 500;

const ALREADY_RUNNING: &str = "A timer is already running; stop it first";

#[derive(Clone)]
pub struct TimerService {
    pool: PgPool,
}

impl TimerService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn start(&self, user_id: Uuid, request: &StartTimer) -> Result<TimerSession, ServiceError> {
        let mut tx = self.pool.begin().await?;
        require_task(&mut *tx, user_id, request.task_id).await?;

        if TimerSession::find_active(&mut *tx, user_id).await?.is_some() {
            return Err(ServiceError::Conflict(ALREADY_RUNNING.to_string()));
        }

        // A concurrent start loses on the one-active-per-user index.
        let session = TimerSession::start(&mut *tx, user_id, request.task_id, request.duration)
            .await
            .map_err(|e| match ServiceError::from(e) {
                ServiceError::Conflict(_) => ServiceError::Conflict(ALREADY_RUNNING.to_string()),
                other => other,
            })?;

        tx.commit().await?;

        info!(session_id = %session.id, task_id = %request.task_id, "Timer started");
        Ok(session)
    }

    pub async fn stop(&self, user_id: Uuid, session_id: Uuid) -> Result<TimerSession, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let session = TimerSession::find_for_update(&mut *tx, session_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Timer session", session_id))?;
        require_owner("timer session", session.user_id, user_id)?;

        if !session.is_active {
            return Err(ServiceError::Conflict("Timer is already stopped".to_string()));
        }

        let end_time = Utc::now();
        let duration = elapsed_seconds(session.start_time, end_time);

        let stopped = TimerSession::finish(&mut *tx, session_id, end_time, duration).await?;
        let actual_minutes = Task::refresh_actual_time(&mut *tx, stopped.task_id).await?;

        tx.commit().await?;

        info!(
            session_id = %session_id,
            task_id = %stopped.task_id,
            duration,
            actual_minutes = ?actual_minutes,
            "Timer stopped"
        );
        Ok(stopped)
    }

    pub async fn active(&self, user_id: Uuid) -> Result<Option<TimerSession>, ServiceError> {
        Ok(TimerSession::find_active(&self.pool, user_id).await?)
    }

    /// Most recent sessions first, capped at [`MAX_HISTORY_LIMIT`]
    pub async fn history(&self, user_id: Uuid, limit: Option<i64>) -> Result<Vec<TimerSession>, ServiceError> {
        let limit = limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT);
        Ok(TimerSession::list_by_user(&self.pool, user_id, limit).await?)
    }

    pub async fn for_task(&self, user_id: Uuid, task_id: Uuid) -> Result<Vec<TimerSession>, ServiceError> {
        let mut conn = self.pool.acquire().await?;
        require_task(&mut *conn, user_id, task_id).await?;

        Ok(TimerSession::list_by_task(&mut *conn, task_id).await?)
    }
}
