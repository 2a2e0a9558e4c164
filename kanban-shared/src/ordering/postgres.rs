//! PostgreSQL-backed [`OrderStore`]
//!
//! Works over a borrowed `PgConnection`, normally the one inside an open
//! `sqlx::Transaction`, so commit and rollback stay with the caller.
//! Table and column names come from a static [`OrderedTable`] descriptor and
//! are never user-supplied.

use async_trait::async_trait;
use sqlx::PgConnection;
use uuid::Uuid;

use super::{OrderError, OrderStore, Placement, Span};

/// Describes one ordered child table and the parent table it is scoped by.
#[derive(Debug)]
pub struct OrderedTable {
    /// Child table holding `position` and `deleted_at`
    pub table: &'static str,

    /// Foreign key column pointing at the parent
    pub scope_column: &'static str,

    /// Parent table, locked while a scope is renumbered
    pub parent_table: &'static str,
}

/// Columns ordered within a board.
pub static COLUMNS: OrderedTable = OrderedTable {
    table: "board_columns",
    scope_column: "board_id",
    parent_table: "boards",
};

/// Tasks ordered within a column.
pub static TASKS: OrderedTable = OrderedTable {
    table: "tasks",
    scope_column: "column_id",
    parent_table: "board_columns",
};

pub struct PgOrderStore<'c> {
    conn: &'c mut PgConnection,
    table: &'static OrderedTable,
}

impl<'c> PgOrderStore<'c> {
    pub fn new(conn: &'c mut PgConnection, table: &'static OrderedTable) -> Self {
        Self { conn, table }
    }
}

#[async_trait]
impl<'c> OrderStore for PgOrderStore<'c> {
    type Scope = Uuid;
    type Item = Uuid;

    async fn lock_scope(&mut self, scope: Uuid) -> Result<(), OrderError> {
        let sql = format!(
            "SELECT id FROM {} WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
            self.table.parent_table
        );

        let locked: Option<Uuid> = sqlx::query_scalar(&sql)
            .bind(scope)
            .fetch_optional(&mut *self.conn)
            .await?;

        locked
            .map(|_| ())
            .ok_or_else(|| OrderError::ScopeNotFound(scope.to_string()))
    }

    async fn placement(&mut self, item: Uuid) -> Result<Option<Placement<Uuid>>, OrderError> {
        let sql = format!(
            "SELECT {}, position FROM {} WHERE id = $1 AND deleted_at IS NULL",
            self.table.scope_column, self.table.table
        );

        let row: Option<(Uuid, i32)> = sqlx::query_as(&sql)
            .bind(item)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(row.map(|(scope, position)| Placement { scope, position }))
    }

    async fn count(&mut self, scope: Uuid) -> Result<i32, OrderError> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = $1 AND deleted_at IS NULL",
            self.table.table, self.table.scope_column
        );

        let count: i64 = sqlx::query_scalar(&sql)
            .bind(scope)
            .fetch_one(&mut *self.conn)
            .await?;

        Ok(count as i32)
    }

    async fn members(&mut self, scope: Uuid) -> Result<Vec<Uuid>, OrderError> {
        let sql = format!(
            "SELECT id FROM {} WHERE {} = $1 AND deleted_at IS NULL \
             ORDER BY position, created_at, id",
            self.table.table, self.table.scope_column
        );

        let ids = sqlx::query_scalar(&sql)
            .bind(scope)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(ids)
    }

    async fn shift(&mut self, scope: Uuid, span: Span, delta: i32) -> Result<u64, OrderError> {
        let sql = format!(
            "UPDATE {} SET position = position + $2, updated_at = NOW() \
             WHERE {} = $1 AND deleted_at IS NULL \
             AND position >= $3 AND ($4::INT4 IS NULL OR position <= $4)",
            self.table.table, self.table.scope_column
        );

        let result = sqlx::query(&sql)
            .bind(scope)
            .bind(delta)
            .bind(span.from)
            .bind(span.to)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected())
    }

    async fn place(&mut self, item: Uuid, scope: Uuid, position: i32) -> Result<(), OrderError> {
        let sql = format!(
            "UPDATE {} SET {} = $2, position = $3, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
            self.table.table, self.table.scope_column
        );

        let result = sqlx::query(&sql)
            .bind(item)
            .bind(scope)
            .bind(position)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(OrderError::ItemNotFound(item.to_string()));
        }
        Ok(())
    }

    async fn remove(&mut self, item: Uuid) -> Result<(), OrderError> {
        let sql = format!(
            "UPDATE {} SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
            self.table.table
        );

        let result = sqlx::query(&sql)
            .bind(item)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(OrderError::ItemNotFound(item.to_string()));
        }
        Ok(())
    }
}
