//! In-memory [`OrderStore`] for engine tests.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;

use super::{OrderError, OrderStore, Placement, Span};

#[derive(Debug, Clone, Copy)]
struct Row {
    scope: u32,
    position: i32,
    deleted: bool,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    scopes: BTreeSet<u32>,
    rows: HashMap<u32, Row>,
    writes: usize,
}

impl MemoryStore {
    pub fn with_scopes(scopes: &[u32]) -> Self {
        Self {
            scopes: scopes.iter().copied().collect(),
            ..Default::default()
        }
    }

    pub fn seeded(scope: u32, items: &[u32]) -> Self {
        let mut store = Self::default();
        store.seed(scope, items);
        store
    }

    pub fn add_scope(&mut self, scope: u32) {
        self.scopes.insert(scope);
    }

    /// Adds `scope` holding `items` at positions 1..=N.
    pub fn seed(&mut self, scope: u32, items: &[u32]) {
        self.add_scope(scope);
        for (index, item) in items.iter().enumerate() {
            self.insert(*item, scope, index as i32 + 1);
        }
    }

    pub fn insert(&mut self, item: u32, scope: u32, position: i32) {
        self.rows.insert(
            item,
            Row {
                scope,
                position,
                deleted: false,
            },
        );
    }

    pub fn placements(&self, scope: u32) -> Vec<(u32, i32)> {
        let mut live: Vec<(u32, i32)> = self
            .rows
            .iter()
            .filter(|(_, row)| row.scope == scope && !row.deleted)
            .map(|(id, row)| (*id, row.position))
            .collect();
        live.sort_by_key(|(id, position)| (*position, *id));
        live
    }

    pub fn ordered(&self, scope: u32) -> Vec<u32> {
        self.placements(scope).into_iter().map(|(id, _)| id).collect()
    }

    pub fn positions(&self, scope: u32) -> Vec<i32> {
        self.placements(scope).into_iter().map(|(_, p)| p).collect()
    }

    pub fn writes(&self) -> usize {
        self.writes
    }

    fn live(&self, item: u32) -> Option<&Row> {
        self.rows.get(&item).filter(|row| !row.deleted)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    type Scope = u32;
    type Item = u32;

    async fn lock_scope(&mut self, scope: u32) -> Result<(), OrderError> {
        if self.scopes.contains(&scope) {
            Ok(())
        } else {
            Err(OrderError::ScopeNotFound(scope.to_string()))
        }
    }

    async fn placement(&mut self, item: u32) -> Result<Option<Placement<u32>>, OrderError> {
        Ok(self.live(item).map(|row| Placement {
            scope: row.scope,
            position: row.position,
        }))
    }

    async fn count(&mut self, scope: u32) -> Result<i32, OrderError> {
        Ok(self.placements(scope).len() as i32)
    }

    async fn members(&mut self, scope: u32) -> Result<Vec<u32>, OrderError> {
        Ok(self.ordered(scope))
    }

    async fn shift(&mut self, scope: u32, span: Span, delta: i32) -> Result<u64, OrderError> {
        self.writes += 1;
        let mut shifted = 0;
        for row in self.rows.values_mut() {
            if row.scope == scope && !row.deleted && span.contains(row.position) {
                row.position += delta;
                shifted += 1;
            }
        }
        Ok(shifted)
    }

    async fn place(&mut self, item: u32, scope: u32, position: i32) -> Result<(), OrderError> {
        self.writes += 1;
        match self.rows.get_mut(&item).filter(|row| !row.deleted) {
            Some(row) => {
                row.scope = scope;
                row.position = position;
                Ok(())
            }
            None => Err(OrderError::ItemNotFound(item.to_string())),
        }
    }

    async fn remove(&mut self, item: u32) -> Result<(), OrderError> {
        self.writes += 1;
        match self.rows.get_mut(&item).filter(|row| !row.deleted) {
            Some(row) => {
                row.deleted = true;
                Ok(())
            }
            None => Err(OrderError::ItemNotFound(item.to_string())),
        }
    }
}
