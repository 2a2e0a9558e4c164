//! Board lifecycle and board-level reads
use std::collections::HashMap;

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::ServiceError;
use crate::auth::ownership::require_board;
use crate::models::board::{Board, BoardPatch, BoardWithColumns, DEFAULT_COLUMNS};
use crate::models::column::{Column, ColumnWithTasks};
use crate::models::task::Task;
use crate::ordering::postgres::{PgOrderStore, COLUMNS};
use crate::ordering::{self, OrderStore};

#[derive(Clone)]
pub struct BoardService {
    pool: PgPool,
}

impl BoardService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a board with the "To Do", "In Progress" and "Done" columns
    pub async fn create(&self, owner_id: Uuid, name: &str) -> Result<BoardWithColumns, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let board = Board::create(&mut *tx, owner_id, name).await?;

        let mut columns = Vec::with_capacity(DEFAULT_COLUMNS.len());
        for title in DEFAULT_COLUMNS {
            let position = {
                let mut store = PgOrderStore::new(&mut *tx, &COLUMNS);
                ordering::append(&mut store, board.id).await?
            };
            columns.push(ColumnWithTasks {
                column: Column::insert(&mut *tx, board.id, title, position).await?,
                tasks: Vec::new(),
            });
        }

        tx.commit().await?;

        info!(board_id = %board.id, owner_id = %owner_id, "Board created");
        Ok(BoardWithColumns { board, columns })
    }

    pub async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Board>, ServiceError> {
        Ok(Board::list_by_owner(&self.pool, owner_id).await?)
    }

    /// Every board of the owner with its ordered columns and tasks
    pub async fn list_with_columns(&self, owner_id: Uuid) -> Result<Vec<BoardWithColumns>, ServiceError> {
        let boards = Board::list_by_owner(&self.pool, owner_id).await?;
        let board_ids: Vec<Uuid> = boards.iter().map(|b| b.id).collect();

        let columns = Column::list_by_boards(&self.pool, &board_ids).await?;
        let column_ids: Vec<Uuid> = columns.iter().map(|c| c.id).collect();
        let tasks = Task::list_by_columns(&self.pool, &column_ids).await?;

        let mut by_board: HashMap<Uuid, Vec<ColumnWithTasks>> = HashMap::new();
        for column in ColumnWithTasks::group(columns, tasks) {
            by_board.entry(column.column.board_id).or_default().push(column);
        }

        Ok(boards
            .into_iter()
            .map(|board| {
                let columns = by_board.remove(&board.id).unwrap_or_default();
                BoardWithColumns { board, columns }
            })
            .collect())
    }

    pub async fn get_with_columns(
        &self,
        user_id: Uuid,
        board_id: Uuid,
    ) -> Result<BoardWithColumns, ServiceError> {
        let mut conn = self.pool.acquire().await?;
        require_board(&mut *conn, user_id, board_id).await?;

        let board = Board::find_by_id(&mut *conn, board_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Board", board_id))?;
        let columns = Column::list_by_board(&mut *conn, board_id).await?;
        let column_ids: Vec<Uuid> = columns.iter().map(|c| c.id).collect();
        let tasks = Task::list_by_columns(&mut *conn, &column_ids).await?;

        Ok(BoardWithColumns {
            board,
            columns: ColumnWithTasks::group(columns, tasks),
        })
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        board_id: Uuid,
        patch: &BoardPatch,
    ) -> Result<Board, ServiceError> {
        let mut tx = self.pool.begin().await?;
        require_board(&mut *tx, user_id, board_id).await?;

        let board = Board::update(&mut *tx, board_id, patch)
            .await?
            .ok_or_else(|| ServiceError::not_found("Board", board_id))?;

        tx.commit().await?;
        Ok(board)
    }

    /// Soft-deletes the board, its columns and their tasks
    pub async fn delete(&self, user_id: Uuid, board_id: Uuid) -> Result<(), ServiceError> {
        let mut tx = self.pool.begin().await?;
        require_board(&mut *tx, user_id, board_id).await?;

        PgOrderStore::new(&mut *tx, &COLUMNS)
            .lock_scope(board_id)
            .await?;

        if !Board::soft_delete_cascade(&mut *tx, board_id).await? {
            return Err(ServiceError::not_found("Board", board_id));
        }

        tx.commit().await?;

        info!(board_id = %board_id, "Board deleted");
        Ok(())
    }
}
