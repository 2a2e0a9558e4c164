//! Calendar settings, events and task scheduling
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use super::ServiceError;
use crate::auth::ownership::{require_owner, require_task};
use crate::models::calendar::{
    check_window, CalendarEvent, CalendarSettings, CreateEvent, EventPatch, SettingsPatch,
    TaskSchedule,
};
use crate::models::task::Task;

#[derive(Clone)]
pub struct CalendarService {
    pool: PgPool,
}

fn ensure_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), ServiceError> {
    check_window(start, end).map_err(|e| {
        ServiceError::Validation(
            e.message
                .map(|m| m.to_string())
                .unwrap_or_else(|| "Invalid time window".to_string()),
        )
    })
}

impl CalendarService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The user's settings, created with defaults on first access
    pub async fn settings(&self, user_id: Uuid) -> Result<CalendarSettings, ServiceError> {
        Ok(CalendarSettings::get_or_create(&self.pool, user_id).await?)
    }

    pub async fn update_settings(
        &self,
        user_id: Uuid,
        patch: &SettingsPatch,
    ) -> Result<CalendarSettings, ServiceError> {
        let settings = CalendarSettings::update(&self.pool, user_id, patch).await?;
        debug!(user_id = %user_id, "Calendar settings updated");
        Ok(settings)
    }

    /// Events overlapping `[start, end)`
    pub async fn events_between(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, ServiceError> {
        ensure_window(start, end)?;
        Ok(CalendarEvent::list_overlapping(&self.pool, user_id, start, end).await?)
    }

    /// Creates a hand-made event; a linked task must belong to the caller
    pub async fn create_event(
        &self,
        user_id: Uuid,
        data: &CreateEvent,
    ) -> Result<CalendarEvent, ServiceError> {
        let mut tx = self.pool.begin().await?;

        if let Some(task_id) = data.task_id {
            require_task(&mut *tx, user_id, task_id).await?;
        }

        let event = CalendarEvent::create(&mut *tx, user_id, data, false).await?;
        tx.commit().await?;

        info!(event_id = %event.id, user_id = %user_id, "Calendar event created");
        Ok(event)
    }

    pub async fn update_event(
        &self,
        user_id: Uuid,
        event_id: Uuid,
        patch: &EventPatch,
    ) -> Result<CalendarEvent, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let existing = CalendarEvent::find_by_id(&mut *tx, event_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Event", event_id))?;
        require_owner("event", existing.user_id, user_id)?;

        ensure_window(
            patch.start_time.unwrap_or(existing.start_time),
            patch.end_time.unwrap_or(existing.end_time),
        )?;

        let event = CalendarEvent::update(&mut *tx, event_id, patch)
            .await?
            .ok_or_else(|| ServiceError::not_found("Event", event_id))?;

        tx.commit().await?;
        Ok(event)
    }

    pub async fn delete_event(&self, user_id: Uuid, event_id: Uuid) -> Result<(), ServiceError> {
        let mut tx = self.pool.begin().await?;

        let existing = CalendarEvent::find_by_id(&mut *tx, event_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Event", event_id))?;
        require_owner("event", existing.user_id, user_id)?;

        CalendarEvent::soft_delete(&mut *tx, event_id).await?;
        tx.commit().await?;

        info!(event_id = %event_id, "Calendar event deleted");
        Ok(())
    }

    /// Schedules a task and adds a task-based event for the window
    pub async fn create_event_from_task(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        schedule: &TaskSchedule,
    ) -> Result<CalendarEvent, ServiceError> {
        ensure_window(schedule.start_time, schedule.end_time)?;

        let mut tx = self.pool.begin().await?;
        require_task(&mut *tx, user_id, task_id).await?;

        let task = Task::set_schedule(&mut *tx, task_id, schedule.start_time, schedule.end_time)
            .await?
            .ok_or_else(|| ServiceError::not_found("Task", task_id))?;

        let data = CreateEvent {
            title: task.title,
            start_time: schedule.start_time,
            end_time: schedule.end_time,
            color: None,
            task_id: Some(task_id),
        };
        let event = CalendarEvent::create(&mut *tx, user_id, &data, true).await?;

        tx.commit().await?;

        info!(event_id = %event.id, task_id = %task_id, "Task scheduled on calendar");
        Ok(event)
    }

    /// Moves a task's schedule; its task-based events follow
    pub async fn update_task_schedule(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        schedule: &TaskSchedule,
    ) -> Result<Task, ServiceError> {
        ensure_window(schedule.start_time, schedule.end_time)?;

        let mut tx = self.pool.begin().await?;
        require_task(&mut *tx, user_id, task_id).await?;

        let task = Task::set_schedule(&mut *tx, task_id, schedule.start_time, schedule.end_time)
            .await?
            .ok_or_else(|| ServiceError::not_found("Task", task_id))?;
        let events = CalendarEvent::reschedule_for_task(
            &mut *tx,
            task_id,
            schedule.start_time,
            schedule.end_time,
        )
        .await?;

        tx.commit().await?;

        debug!(task_id = %task_id, events, "Task schedule updated");
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_ensure_window() {
        let now = Utc::now();
        assert!(ensure_window(now, now + Duration::minutes(30)).is_ok());

        match ensure_window(now, now) {
            Err(ServiceError::Validation(message)) => {
                assert_eq!(message, "End time must be after start time")
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
