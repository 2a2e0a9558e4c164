//! Board model and database operations
//!
//! A board belongs to one owner and holds an ordered list of columns.
//! Deleting a board soft-deletes the board, its columns and their tasks.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE boards (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     name VARCHAR(100) NOT NULL,
//!     owner_id UUID NOT NULL REFERENCES users (id),
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     deleted_at TIMESTAMPTZ
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgExecutor};
use uuid::Uuid;
use validator::Validate;

use super::column::ColumnWithTasks;

/// Titles of the columns every new board starts with, in order.
pub const DEFAULT_COLUMNS: [&str; 3] = ["To Do", "In Progress", "Done"];

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Board {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Board together with its live columns and their tasks, in order
#[derive(Debug, Clone, Serialize)]
pub struct BoardWithColumns {
    #[serde(flatten)]
    pub board: Board,
    pub columns: Vec<ColumnWithTasks>,
}

/// Input for creating a board
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBoard {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

/// Partial update for a board
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct BoardPatch {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
}

impl Board {
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        owner_id: Uuid,
        name: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Board>(
            r#"
            INSERT INTO boards (name, owner_id)
            VALUES ($1, $2)
            RETURNING id, name, owner_id, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(owner_id)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Board>(
            r#"
            SELECT id, name, owner_id, created_at, updated_at
            FROM boards
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Lists the owner's live boards, oldest first
    pub async fn list_by_owner<'e, E: PgExecutor<'e>>(
        executor: E,
        owner_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Board>(
            r#"
            SELECT id, name, owner_id, created_at, updated_at
            FROM boards
            WHERE owner_id = $1 AND deleted_at IS NULL
            ORDER BY created_at, id
            "#,
        )
        .bind(owner_id)
        .fetch_all(executor)
        .await
    }

    /// Applies a partial update; returns `None` if the board is gone
    pub async fn update<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        patch: &BoardPatch,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Board>(
            r#"
            UPDATE boards
            SET name = COALESCE($2, name), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, name, owner_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(patch.name.as_deref())
        .fetch_optional(executor)
        .await
    }

    /// Soft-deletes the board with its columns and tasks
    ///
    /// Must run inside a transaction; the three statements only make sense
    /// together. Returns false if the board was already gone.
    pub async fn soft_delete_cascade(conn: &mut PgConnection, id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE tasks SET deleted_at = NOW(), updated_at = NOW()
            WHERE deleted_at IS NULL
              AND column_id IN (SELECT id FROM board_columns WHERE board_id = $1)
            "#,
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            r#"
            UPDATE board_columns SET deleted_at = NOW(), updated_at = NOW()
            WHERE board_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;

        let result = sqlx::query(
            r#"
            UPDATE boards SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_columns() {
        assert_eq!(DEFAULT_COLUMNS, ["To Do", "In Progress", "Done"]);
    }

    #[test]
    fn test_create_board_validation() {
        assert!(CreateBoard { name: "Sprint".into() }.validate().is_ok());
        assert!(CreateBoard { name: String::new() }.validate().is_err());
        assert!(CreateBoard { name: "x".repeat(101) }.validate().is_err());
    }

    #[test]
    fn test_board_patch_validation() {
        assert!(BoardPatch::default().validate().is_ok());
        assert!(BoardPatch { name: Some(String::new()) }.validate().is_err());
    }

    #[test]
    fn test_board_with_columns_flattens() {
        let board = Board {
            id: Uuid::new_v4(),
            name: "Home".to_string(),
            owner_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(BoardWithColumns {
            board,
            columns: vec![],
        })
        .unwrap();

        assert_eq!(json["name"], "Home");
        assert!(json["columns"].as_array().unwrap().is_empty());
    }
}
