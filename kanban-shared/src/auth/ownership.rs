//! Ownership checks for boards, columns and tasks
//!
//! Every board has exactly one owner and columns and tasks inherit it through
//! their parents. A resource that does not exist, or whose parent chain has
//! been soft-deleted, is reported as not found; one that exists but belongs to
//! someone else is forbidden.
//!
//! The checks run against an [`OwnershipLookup`], implemented for
//! `PgConnection` so they can share the caller's transaction.
//!
//! # Example
//!
//! ```no_run
//! use kanban_shared::auth::ownership::require_task;
//! use sqlx::PgPool;
//! use uuid::Uuid;
//!
//! # async fn example(pool: PgPool, user_id: Uuid, task_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
//! let mut tx = pool.begin().await?;
//! let scope = require_task(&mut *tx, user_id, task_id).await?;
//! println!("task lives on board {}", scope.board_id);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use sqlx::PgConnection;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: Uuid },

    #[error("Not authorized to access this {kind}")]
    Forbidden { kind: &'static str },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Owner chain of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct ColumnScope {
    pub column_id: Uuid,
    pub board_id: Uuid,
    pub owner_id: Uuid,
}

/// Owner chain of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct TaskScope {
    pub task_id: Uuid,
    pub column_id: Uuid,
    pub board_id: Uuid,
    pub owner_id: Uuid,
}

/// Resolves live resources to their owners
#[async_trait]
pub trait OwnershipLookup: Send {
    async fn board_owner(&mut self, board_id: Uuid) -> Result<Option<Uuid>, sqlx::Error>;

    async fn column_scope(&mut self, column_id: Uuid) -> Result<Option<ColumnScope>, sqlx::Error>;

    async fn task_scope(&mut self, task_id: Uuid) -> Result<Option<TaskScope>, sqlx::Error>;
}

#[async_trait]
impl OwnershipLookup for PgConnection {
    async fn board_owner(&mut self, board_id: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
        sqlx::query_scalar("SELECT owner_id FROM boards WHERE id = $1 AND deleted_at IS NULL")
            .bind(board_id)
            .fetch_optional(&mut *self)
            .await
    }

    async fn column_scope(&mut self, column_id: Uuid) -> Result<Option<ColumnScope>, sqlx::Error> {
        sqlx::query_as::<_, ColumnScope>(
            r#"
            SELECT c.id AS column_id, b.id AS board_id, b.owner_id
            FROM board_columns c
            JOIN boards b ON b.id = c.board_id AND b.deleted_at IS NULL
            WHERE c.id = $1 AND c.deleted_at IS NULL
            "#,
        )
        .bind(column_id)
        .fetch_optional(&mut *self)
        .await
    }

    async fn task_scope(&mut self, task_id: Uuid) -> Result<Option<TaskScope>, sqlx::Error> {
        sqlx::query_as::<_, TaskScope>(
            r#"
            SELECT t.id AS task_id, c.id AS column_id, b.id AS board_id, b.owner_id
            FROM tasks t
            JOIN board_columns c ON c.id = t.column_id AND c.deleted_at IS NULL
            JOIN boards b ON b.id = c.board_id AND b.deleted_at IS NULL
            WHERE t.id = $1 AND t.deleted_at IS NULL
            "#,
        )
        .bind(task_id)
        .fetch_optional(&mut *self)
        .await
    }
}

/// Checks that `owner_id` is the caller
pub fn require_owner(kind: &'static str, owner_id: Uuid, user_id: Uuid) -> Result<(), AccessError> {
    if owner_id != user_id {
        return Err(AccessError::Forbidden { kind });
    }
    Ok(())
}

pub async fn require_board<L>(lookup: &mut L, user_id: Uuid, board_id: Uuid) -> Result<(), AccessError>
where
    L: OwnershipLookup + ?Sized,
{
    let owner_id = lookup
        .board_owner(board_id)
        .await?
        .ok_or(AccessError::NotFound { kind: "Board", id: board_id })?;

    require_owner("board", owner_id, user_id)
}

pub async fn require_column<L>(
    lookup: &mut L,
    user_id: Uuid,
    column_id: Uuid,
) -> Result<ColumnScope, AccessError>
where
    L: OwnershipLookup + ?Sized,
{
    let scope = lookup
        .column_scope(column_id)
        .await?
        .ok_or(AccessError::NotFound { kind: "Column", id: column_id })?;

    require_owner("column", scope.owner_id, user_id)?;
    Ok(scope)
}

pub async fn require_task<L>(lookup: &mut L, user_id: Uuid, task_id: Uuid) -> Result<TaskScope, AccessError>
where
    L: OwnershipLookup + ?Sized,
{
    let scope = lookup
        .task_scope(task_id)
        .await?
        .ok_or(AccessError::NotFound { kind: "Task", id: task_id })?;

    require_owner("task", scope.owner_id, user_id)?;
    Ok(scope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeLookup {
        boards: HashMap<Uuid, Uuid>,
        columns: HashMap<Uuid, Uuid>,
        tasks: HashMap<Uuid, Uuid>,
    }

    impl FakeLookup {
        /// owner -> board -> column -> task
        fn chain(owner: Uuid) -> (Self, Uuid, Uuid, Uuid) {
            let (board, column, task) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
            let mut lookup = Self::default();
            lookup.boards.insert(board, owner);
            lookup.columns.insert(column, board);
            lookup.tasks.insert(task, column);
            (lookup, board, column, task)
        }
    }

    #[async_trait]
    impl OwnershipLookup for FakeLookup {
        async fn board_owner(&mut self, board_id: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
            Ok(self.boards.get(&board_id).copied())
        }

        async fn column_scope(&mut self, column_id: Uuid) -> Result<Option<ColumnScope>, sqlx::Error> {
            let Some(&board_id) = self.columns.get(&column_id) else {
                return Ok(None);
            };
            Ok(self.boards.get(&board_id).map(|&owner_id| ColumnScope {
                column_id,
                board_id,
                owner_id,
            }))
        }

        async fn task_scope(&mut self, task_id: Uuid) -> Result<Option<TaskScope>, sqlx::Error> {
            let Some(&column_id) = self.tasks.get(&task_id) else {
                return Ok(None);
            };
            Ok(self.column_scope(column_id).await?.map(|c| TaskScope {
                task_id,
                column_id,
                board_id: c.board_id,
                owner_id: c.owner_id,
            }))
        }
    }

    #[tokio::test]
    async fn test_owner_passes_every_level() {
        let owner = Uuid::new_v4();
        let (mut lookup, board, column, task) = FakeLookup::chain(owner);

        require_board(&mut lookup, owner, board).await.unwrap();

        let column_scope = require_column(&mut lookup, owner, column).await.unwrap();
        assert_eq!(column_scope.board_id, board);

        let task_scope = require_task(&mut lookup, owner, task).await.unwrap();
        assert_eq!(task_scope.column_id, column);
        assert_eq!(task_scope.board_id, board);
    }

    #[tokio::test]
    async fn test_other_user_is_forbidden() {
        let (mut lookup, board, column, task) = FakeLookup::chain(Uuid::new_v4());
        let stranger = Uuid::new_v4();

        assert!(matches!(
            require_board(&mut lookup, stranger, board).await,
            Err(AccessError::Forbidden { kind: "board" })
        ));
        assert!(matches!(
            require_column(&mut lookup, stranger, column).await,
            Err(AccessError::Forbidden { .. })
        ));
        assert!(matches!(
            require_task(&mut lookup, stranger, task).await,
            Err(AccessError::Forbidden { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_resource_is_not_found() {
        let owner = Uuid::new_v4();
        let (mut lookup, _, _, _) = FakeLookup::chain(owner);
        let missing = Uuid::new_v4();

        assert!(matches!(
            require_board(&mut lookup, owner, missing).await,
            Err(AccessError::NotFound { kind: "Board", .. })
        ));
        assert!(matches!(
            require_task(&mut lookup, owner, missing).await,
            Err(AccessError::NotFound { kind: "Task", .. })
        ));
    }

    #[tokio::test]
    async fn test_deleted_parent_hides_children() {
        let owner = Uuid::new_v4();
        let (mut lookup, board, column, task) = FakeLookup::chain(owner);
        lookup.boards.remove(&board);

        assert!(matches!(
            require_column(&mut lookup, owner, column).await,
            Err(AccessError::NotFound { .. })
        ));
        assert!(matches!(
            require_task(&mut lookup, owner, task).await,
            Err(AccessError::NotFound { .. })
        ));
    }

    #[test]
    fn test_require_owner() {
        let user = Uuid::new_v4();
        assert!(require_owner("event", user, user).is_ok());
        assert!(require_owner("event", Uuid::new_v4(), user).is_err());
    }
}
