//! Task CRUD, moves between columns and in-column reordering
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::ServiceError;
use crate::auth::ownership::{require_column, require_task};
use crate::models::task::{CreateTask, MoveTask, Task, TaskPatch};
use crate::ordering;
use crate::ordering::postgres::{PgOrderStore, TASKS};

#[derive(Clone)]
pub struct TaskService {
    pool: PgPool,
}

impl TaskService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Adds a task at `order`, or at the end of the column when absent
    pub async fn create(&self, user_id: Uuid, data: &CreateTask) -> Result<Task, ServiceError> {
        let mut tx = self.pool.begin().await?;
        require_column(&mut *tx, user_id, data.column_id).await?;

        let position = {
            let mut store = PgOrderStore::new(&mut *tx, &TASKS);
            match data.order {
                Some(target) => ordering::insert_at(&mut store, data.column_id, target).await?,
                None => ordering::append(&mut store, data.column_id).await?,
            }
        };

        let task = Task::insert(&mut *tx, data, position).await?;
        tx.commit().await?;

        info!(task_id = %task.id, column_id = %task.column_id, position, "Task created");
        Ok(task)
    }

    pub async fn get(&self, user_id: Uuid, task_id: Uuid) -> Result<Task, ServiceError> {
        let mut conn = self.pool.acquire().await?;
        require_task(&mut *conn, user_id, task_id).await?;

        Task::find_by_id(&mut *conn, task_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Task", task_id))
    }

    /// Applies a partial update; `order` moves the task within its column
    pub async fn update(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        patch: &TaskPatch,
    ) -> Result<Task, ServiceError> {
        let mut tx = self.pool.begin().await?;
        require_task(&mut *tx, user_id, task_id).await?;

        if let Some(target) = patch.order {
            let mut store = PgOrderStore::new(&mut *tx, &TASKS);
            ordering::move_within(&mut store, task_id, target).await?;
        }

        let updated = if patch.has_field_changes() {
            Task::update(&mut *tx, task_id, patch).await?
        } else {
            Task::find_by_id(&mut *tx, task_id).await?
        };
        let task = updated.ok_or_else(|| ServiceError::not_found("Task", task_id))?;

        // One bound may come from the patch and the other from the stored row.
        if let (Some(start), Some(end)) = (task.scheduled_start, task.scheduled_end) {
            if end <= start {
                return Err(ServiceError::Validation(
                    "End time must be after start time".to_string(),
                ));
            }
        }

        tx.commit().await?;
        Ok(task)
    }

    /// Deletes the task and closes the gap in its column
    pub async fn delete(&self, user_id: Uuid, task_id: Uuid) -> Result<(), ServiceError> {
        let mut tx = self.pool.begin().await?;
        require_task(&mut *tx, user_id, task_id).await?;

        let placement = {
            let mut store = PgOrderStore::new(&mut *tx, &TASKS);
            ordering::delete(&mut store, task_id).await?
        };

        tx.commit().await?;

        info!(task_id = %task_id, column_id = %placement.scope, "Task deleted");
        Ok(())
    }

    /// Moves a task to `new_order` in `new_column_id`
    ///
    /// Both the task's current column and the destination must belong to the
    /// caller. The destination may be the current column.
    pub async fn move_task(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        request: &MoveTask,
    ) -> Result<Task, ServiceError> {
        let mut tx = self.pool.begin().await?;
        require_task(&mut *tx, user_id, task_id).await?;
        require_column(&mut *tx, user_id, request.new_column_id).await?;

        let placement = {
            let mut store = PgOrderStore::new(&mut *tx, &TASKS);
            ordering::move_across(&mut store, task_id, request.new_column_id, request.new_order)
                .await?
        };

        let task = Task::find_by_id(&mut *tx, task_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Task", task_id))?;

        tx.commit().await?;

        info!(
            task_id = %task_id,
            column_id = %placement.scope,
            position = placement.position,
            "Task moved"
        );
        Ok(task)
    }

    /// Puts the column's tasks in the order of `ids`
    pub async fn reorder(
        &self,
        user_id: Uuid,
        column_id: Uuid,
        ids: &[Uuid],
    ) -> Result<Vec<Task>, ServiceError> {
        let mut tx = self.pool.begin().await?;
        require_column(&mut *tx, user_id, column_id).await?;

        {
            let mut store = PgOrderStore::new(&mut *tx, &TASKS);
            ordering::bulk_reorder(&mut store, column_id, ids).await?;
        }

        let tasks = Task::list_by_column(&mut *tx, column_id).await?;
        tx.commit().await?;
        Ok(tasks)
    }
}
