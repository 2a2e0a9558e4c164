//! Column create/update/delete and column reordering within a board
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::ServiceError;
use crate::auth::ownership::{require_board, require_column};
use crate::models::column::{Column, ColumnPatch, CreateColumn};
use crate::ordering;
use crate::ordering::postgres::{PgOrderStore, COLUMNS};

#[derive(Clone)]
pub struct ColumnService {
    pool: PgPool,
}

impl ColumnService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Adds a column at `order`, or after the last column when absent
    pub async fn create(
        &self,
        user_id: Uuid,
        board_id: Uuid,
        data: &CreateColumn,
    ) -> Result<Column, ServiceError> {
        let mut tx = self.pool.begin().await?;
        require_board(&mut *tx, user_id, board_id).await?;

        let position = {
            let mut store = PgOrderStore::new(&mut *tx, &COLUMNS);
            match data.order {
                Some(target) => ordering::insert_at(&mut store, board_id, target).await?,
                None => ordering::append(&mut store, board_id).await?,
            }
        };

        let column = Column::insert(&mut *tx, board_id, &data.title, position).await?;
        tx.commit().await?;

        info!(column_id = %column.id, board_id = %board_id, position, "Column created");
        Ok(column)
    }

    /// Renames and/or moves a column within its board
    pub async fn update(
        &self,
        user_id: Uuid,
        column_id: Uuid,
        patch: &ColumnPatch,
    ) -> Result<Column, ServiceError> {
        let mut tx = self.pool.begin().await?;
        require_column(&mut *tx, user_id, column_id).await?;

        if let Some(title) = patch.title.as_deref() {
            if !Column::rename(&mut *tx, column_id, title).await? {
                return Err(ServiceError::not_found("Column", column_id));
            }
        }

        if let Some(target) = patch.order {
            let mut store = PgOrderStore::new(&mut *tx, &COLUMNS);
            ordering::move_within(&mut store, column_id, target).await?;
        }

        let column = Column::find_by_id(&mut *tx, column_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Column", column_id))?;

        tx.commit().await?;
        Ok(column)
    }

    /// Deletes the column and its tasks, closing the gap in the board
    pub async fn delete(&self, user_id: Uuid, column_id: Uuid) -> Result<(), ServiceError> {
        let mut tx = self.pool.begin().await?;
        require_column(&mut *tx, user_id, column_id).await?;

        let placement = {
            let mut store = PgOrderStore::new(&mut *tx, &COLUMNS);
            ordering::delete(&mut store, column_id).await?
        };
        let tasks = Column::soft_delete_tasks(&mut *tx, column_id).await?;

        tx.commit().await?;

        info!(
            column_id = %column_id,
            board_id = %placement.scope,
            position = placement.position,
            tasks,
            "Column deleted"
        );
        Ok(())
    }

    /// Puts the board's columns in the order of `ids`
    ///
    /// Columns missing from `ids` keep their relative order after the listed
    /// ones.
    pub async fn reorder(
        &self,
        user_id: Uuid,
        board_id: Uuid,
        ids: &[Uuid],
    ) -> Result<Vec<Column>, ServiceError> {
        let mut tx = self.pool.begin().await?;
        require_board(&mut *tx, user_id, board_id).await?;

        {
            let mut store = PgOrderStore::new(&mut *tx, &COLUMNS);
            ordering::bulk_reorder(&mut store, board_id, ids).await?;
        }

        let columns = Column::list_by_board(&mut *tx, board_id).await?;
        tx.commit().await?;
        Ok(columns)
    }
}
