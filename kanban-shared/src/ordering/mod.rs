//! Ordered child lists (columns within a board, tasks within a column)
//!
//! Every live member of a scope holds a distinct `position` and the set of
//! positions is exactly `1..=N`. The functions in this module are the only
//! code that changes positions; each one keeps that property as a
//! postcondition, assuming it held on entry.
//!
//! The engine is generic over [`OrderStore`], which abstracts the
//! transactional storage. Callers open a transaction, build a store over it,
//! run one operation and commit. Any error leaves the transaction to be
//! rolled back, so partial renumbering is never persisted.
//!
//! Each operation starts by locking the scope's parent row, which serializes
//! concurrent renumbering of the same scope.
//!
//! # Example
//!
//! ```no_run
//! use kanban_shared::ordering::{self, postgres::{PgOrderStore, TASKS}};
//! use sqlx::PgPool;
//! use uuid::Uuid;
//!
//! # async fn example(pool: PgPool, task_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
//! let mut tx = pool.begin().await?;
//! let mut store = PgOrderStore::new(&mut *tx, &TASKS);
//! ordering::move_within(&mut store, task_id, 1).await?;
//! tx.commit().await?;
//! # Ok(())
//! # }
//! ```

pub mod plan;
pub mod postgres;

#[cfg(test)]
pub(crate) mod memory;

use std::fmt::{Debug, Display};
use std::hash::Hash;

use async_trait::async_trait;
use tracing::debug;

pub use plan::Span;

/// Error type for ordering operations
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// Parent scope is missing or soft-deleted
    #[error("Scope not found: {0}")]
    ScopeNotFound(String),

    /// Member is missing or soft-deleted
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Requested position is below 1
    #[error("Invalid position {0}: positions start at 1")]
    InvalidPosition(i32),

    /// Bulk reorder listed the same id twice
    #[error("Item {0} listed more than once")]
    DuplicateItem(String),

    /// Bulk reorder listed an id from another scope
    #[error("Item {0} does not belong to this scope")]
    ForeignItem(String),

    /// Member changed scope between read and lock
    #[error("Item {0} was moved concurrently")]
    Concurrent(String),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Where a member currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement<S> {
    pub scope: S,
    pub position: i32,
}

/// Transaction-scoped storage used by the ordering engine.
///
/// Implementations only ever see live (non-deleted) members.
#[async_trait]
pub trait OrderStore: Send {
    type Scope: Copy + Eq + Ord + Debug + Display + Send + Sync;
    type Item: Copy + Eq + Hash + Debug + Display + Send + Sync;

    /// Locks the parent row of `scope` until the transaction ends.
    ///
    /// Fails with [`OrderError::ScopeNotFound`] when the parent is missing.
    async fn lock_scope(&mut self, scope: Self::Scope) -> Result<(), OrderError>;

    async fn placement(
        &mut self,
        item: Self::Item,
    ) -> Result<Option<Placement<Self::Scope>>, OrderError>;

    async fn count(&mut self, scope: Self::Scope) -> Result<i32, OrderError>;

    /// Live members of `scope` in position order.
    async fn members(&mut self, scope: Self::Scope) -> Result<Vec<Self::Item>, OrderError>;

    /// Adds `delta` to the position of every member of `scope` inside `span`.
    async fn shift(
        &mut self,
        scope: Self::Scope,
        span: Span,
        delta: i32,
    ) -> Result<u64, OrderError>;

    /// Sets scope and position of `item` in one write.
    async fn place(
        &mut self,
        item: Self::Item,
        scope: Self::Scope,
        position: i32,
    ) -> Result<(), OrderError>;

    /// Soft-deletes `item`.
    async fn remove(&mut self, item: Self::Item) -> Result<(), OrderError>;
}

/// Reads an item's placement and locks its scope, re-checking that the item
/// did not move in between.
async fn locked_placement<S: OrderStore + ?Sized>(
    store: &mut S,
    item: S::Item,
) -> Result<Placement<S::Scope>, OrderError> {
    let seen = store
        .placement(item)
        .await?
        .ok_or_else(|| OrderError::ItemNotFound(item.to_string()))?;

    store.lock_scope(seen.scope).await?;

    let locked = store
        .placement(item)
        .await?
        .ok_or_else(|| OrderError::ItemNotFound(item.to_string()))?;

    if locked.scope != seen.scope {
        return Err(OrderError::Concurrent(item.to_string()));
    }
    Ok(locked)
}

/// Reserves the slot after the last member of `scope`.
///
/// The caller inserts the new row with the returned position in the same
/// transaction.
pub async fn append<S: OrderStore + ?Sized>(
    store: &mut S,
    scope: S::Scope,
) -> Result<i32, OrderError> {
    store.lock_scope(scope).await?;
    let count = store.count(scope).await?;
    Ok(count + 1)
}

/// Opens a slot at `target` in `scope` and returns it.
///
/// Targets past the end are clamped to `count + 1`. Members at or after the
/// slot move down by one; the caller inserts the new row with the returned
/// position in the same transaction.
///
/// # Errors
///
/// - [`OrderError::InvalidPosition`] when `target < 1`
/// - [`OrderError::ScopeNotFound`] when the parent is missing
pub async fn insert_at<S: OrderStore + ?Sized>(
    store: &mut S,
    scope: S::Scope,
    target: i32,
) -> Result<i32, OrderError> {
    if target < 1 {
        return Err(OrderError::InvalidPosition(target));
    }

    store.lock_scope(scope).await?;
    let count = store.count(scope).await?;
    let slot = plan::clamp_insert(target, count)?;

    if slot <= count {
        let shifted = store.shift(scope, Span::from(slot), 1).await?;
        debug!(%scope, slot, shifted, "Opened slot");
    }

    Ok(slot)
}

/// Removes `item` and closes the gap it leaves.
///
/// Returns where the item was.
pub async fn delete<S: OrderStore + ?Sized>(
    store: &mut S,
    item: S::Item,
) -> Result<Placement<S::Scope>, OrderError> {
    let placement = locked_placement(store, item).await?;

    store.remove(item).await?;
    let shifted = store
        .shift(placement.scope, Span::above(placement.position), -1)
        .await?;

    debug!(%item, scope = %placement.scope, position = placement.position, shifted, "Closed gap");
    Ok(placement)
}

/// Moves `item` to `target` inside its current scope.
///
/// Targets past the end are clamped to the last position. Returns the final
/// placement; moving to the current position is a no-op.
pub async fn move_within<S: OrderStore + ?Sized>(
    store: &mut S,
    item: S::Item,
    target: i32,
) -> Result<Placement<S::Scope>, OrderError> {
    if target < 1 {
        return Err(OrderError::InvalidPosition(target));
    }

    let current = locked_placement(store, item).await?;
    let count = store.count(current.scope).await?;
    let new_position = plan::clamp_move(target, count)?;

    let Some((span, delta)) = plan::shift_for_move(current.position, new_position) else {
        return Ok(current);
    };

    store.shift(current.scope, span, delta).await?;
    store.place(item, current.scope, new_position).await?;

    debug!(
        %item,
        scope = %current.scope,
        from = current.position,
        to = new_position,
        "Moved within scope"
    );

    Ok(Placement {
        scope: current.scope,
        position: new_position,
    })
}

/// Moves `item` into `destination` at `target`.
///
/// Closes the gap in the source scope, opens one in the destination and
/// writes the new scope and position together. Both parents are locked in
/// a fixed order so two opposite moves cannot deadlock. A destination equal
/// to the current scope is handled as [`move_within`].
pub async fn move_across<S: OrderStore + ?Sized>(
    store: &mut S,
    item: S::Item,
    destination: S::Scope,
    target: i32,
) -> Result<Placement<S::Scope>, OrderError> {
    if target < 1 {
        return Err(OrderError::InvalidPosition(target));
    }

    let seen = store
        .placement(item)
        .await?
        .ok_or_else(|| OrderError::ItemNotFound(item.to_string()))?;

    if seen.scope == destination {
        return move_within(store, item, target).await;
    }

    let (first, second) = if seen.scope < destination {
        (seen.scope, destination)
    } else {
        (destination, seen.scope)
    };
    store.lock_scope(first).await?;
    store.lock_scope(second).await?;

    let source = store
        .placement(item)
        .await?
        .ok_or_else(|| OrderError::ItemNotFound(item.to_string()))?;
    if source.scope != seen.scope {
        return Err(OrderError::Concurrent(item.to_string()));
    }

    let dest_count = store.count(destination).await?;
    let slot = plan::clamp_insert(target, dest_count)?;

    store
        .shift(source.scope, Span::above(source.position), -1)
        .await?;
    store.shift(destination, Span::from(slot), 1).await?;
    store.place(item, destination, slot).await?;

    debug!(
        %item,
        from_scope = %source.scope,
        from = source.position,
        to_scope = %destination,
        to = slot,
        "Moved across scopes"
    );

    Ok(Placement {
        scope: destination,
        position: slot,
    })
}

/// Renumbers `scope` to follow `ids`.
///
/// Listed ids take positions `1..=ids.len()` in the given order. Live
/// members that are not listed follow them in their previous relative
/// order, so the scope stays contiguous. Repeating the same call is a no-op.
///
/// # Errors
///
/// - [`OrderError::DuplicateItem`] when an id is listed twice
/// - [`OrderError::ForeignItem`] when an id is not a live member of `scope`
pub async fn bulk_reorder<S: OrderStore + ?Sized>(
    store: &mut S,
    scope: S::Scope,
    ids: &[S::Item],
) -> Result<Vec<S::Item>, OrderError> {
    store.lock_scope(scope).await?;

    let current = store.members(scope).await?;
    let resolved = plan::resolve_reorder(&current, ids)?;

    let mut written = 0usize;
    for (index, id) in resolved.iter().enumerate() {
        if current.get(index) != Some(id) {
            store.place(*id, scope, index as i32 + 1).await?;
            written += 1;
        }
    }

    debug!(%scope, members = resolved.len(), written, "Reordered scope");
    Ok(resolved)
}
