//! Column model and database operations
//!
//! Columns live in `board_columns` (`column` is reserved in SQL). The
//! `position` field is owned by [`crate::ordering`]; nothing here changes it
//! except the initial insert.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;
use validator::Validate;

use super::task::Task;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Column {
    pub id: Uuid,
    pub board_id: Uuid,
    pub title: String,

    /// 1-based, contiguous among the board's live columns
    #[serde(rename = "order")]
    pub position: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column together with its live tasks in order
#[derive(Debug, Clone, Serialize)]
pub struct ColumnWithTasks {
    #[serde(flatten)]
    pub column: Column,
    pub tasks: Vec<Task>,
}

impl ColumnWithTasks {
    /// Pairs each column with its tasks; `tasks` must be ordered by position
    pub fn group(columns: Vec<Column>, tasks: Vec<Task>) -> Vec<Self> {
        let mut by_column: std::collections::HashMap<Uuid, Vec<Task>> =
            std::collections::HashMap::new();
        for task in tasks {
            by_column.entry(task.column_id).or_default().push(task);
        }

        columns
            .into_iter()
            .map(|column| {
                let tasks = by_column.remove(&column.id).unwrap_or_default();
                ColumnWithTasks { column, tasks }
            })
            .collect()
    }
}

/// Input for creating a column
///
/// Without `order` the column is appended.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateColumn {
    #[validate(length(min = 1, max = 50, message = "Title must be 1-50 characters"))]
    pub title: String,

    #[validate(range(min = 1, message = "Order must be at least 1"))]
    pub order: Option<i32>,
}

/// Partial update for a column
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ColumnPatch {
    #[validate(length(min = 1, max = 50, message = "Title must be 1-50 characters"))]
    pub title: Option<String>,

    #[validate(range(min = 1, message = "Order must be at least 1"))]
    pub order: Option<i32>,
}

impl Column {
    pub async fn insert<'e, E: PgExecutor<'e>>(
        executor: E,
        board_id: Uuid,
        title: &str,
        position: i32,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Column>(
            r#"
            INSERT INTO board_columns (board_id, title, position)
            VALUES ($1, $2, $3)
            RETURNING id, board_id, title, position, created_at, updated_at
            "#,
        )
        .bind(board_id)
        .bind(title)
        .bind(position)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Column>(
            r#"
            SELECT id, board_id, title, position, created_at, updated_at
            FROM board_columns
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Live columns of a board in order
    pub async fn list_by_board<'e, E: PgExecutor<'e>>(
        executor: E,
        board_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Column>(
            r#"
            SELECT id, board_id, title, position, created_at, updated_at
            FROM board_columns
            WHERE board_id = $1 AND deleted_at IS NULL
            ORDER BY position
            "#,
        )
        .bind(board_id)
        .fetch_all(executor)
        .await
    }

    /// Live columns of several boards, grouped by board then ordered
    pub async fn list_by_boards<'e, E: PgExecutor<'e>>(
        executor: E,
        board_ids: &[Uuid],
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Column>(
            r#"
            SELECT id, board_id, title, position, created_at, updated_at
            FROM board_columns
            WHERE board_id = ANY($1) AND deleted_at IS NULL
            ORDER BY board_id, position
            "#,
        )
        .bind(board_ids)
        .fetch_all(executor)
        .await
    }

    pub async fn rename<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        title: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE board_columns SET title = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(title)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Soft-deletes every live task of the column
    pub async fn soft_delete_tasks<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE tasks SET deleted_at = NOW(), updated_at = NOW()
            WHERE column_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_serialized_as_order() {
        let column = Column {
            id: Uuid::new_v4(),
            board_id: Uuid::new_v4(),
            title: "Done".to_string(),
            position: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&column).unwrap();
        assert_eq!(json["order"], 3);
        assert!(json.get("position").is_none());
    }

    #[test]
    fn test_create_column_validation() {
        let ok = CreateColumn {
            title: "Review".into(),
            order: Some(2),
        };
        assert!(ok.validate().is_ok());

        let zero = CreateColumn {
            title: "Review".into(),
            order: Some(0),
        };
        assert!(zero.validate().is_err());

        let long = CreateColumn {
            title: "x".repeat(51),
            order: None,
        };
        assert!(long.validate().is_err());
    }

    fn column(position: i32) -> Column {
        Column {
            id: Uuid::new_v4(),
            board_id: Uuid::new_v4(),
            title: format!("Column {}", position),
            position,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn task(column_id: Uuid, position: i32) -> Task {
        Task {
            id: Uuid::new_v4(),
            column_id,
            title: format!("Task {}", position),
            description: String::new(),
            position,
            assignee_id: None,
            due_date: None,
            estimated_time: None,
            actual_time: None,
            is_completed: false,
            completed_at: None,
            scheduled_start: None,
            scheduled_end: None,
            calendar_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_group_tasks_by_column() {
        let (todo, done) = (column(1), column(2));
        let tasks = vec![task(todo.id, 1), task(todo.id, 2)];
        let first = tasks[0].id;

        let grouped = ColumnWithTasks::group(vec![todo, done], tasks);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].tasks.len(), 2);
        assert_eq!(grouped[0].tasks[0].id, first);
        assert!(grouped[1].tasks.is_empty());

        let json = serde_json::to_value(&grouped[0]).unwrap();
        assert_eq!(json["order"], 1);
        assert_eq!(json["tasks"][1]["order"], 2);
    }
}
