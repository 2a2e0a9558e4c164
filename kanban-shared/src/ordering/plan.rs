//! Position arithmetic for the ordering engine.
//!
//! Everything here is storage-free so the shift rules can be checked in
//! isolation. Positions are 1-based and a scope with `count` live members
//! occupies exactly `1..=count`.

use std::collections::HashSet;
use std::hash::Hash;

use super::OrderError;

/// Inclusive range of positions affected by a shift.
///
/// `to: None` leaves the range open at the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub from: i32,
    pub to: Option<i32>,
}

impl Span {
    /// Every position `>= from`.
    pub fn from(from: i32) -> Self {
        Self { from, to: None }
    }

    /// Every position `> position`.
    pub fn above(position: i32) -> Self {
        Self {
            from: position + 1,
            to: None,
        }
    }

    /// Positions in `from..=to`.
    pub fn between(from: i32, to: i32) -> Self {
        Self { from, to: Some(to) }
    }

    pub fn contains(&self, position: i32) -> bool {
        position >= self.from && self.to.map_or(true, |to| position <= to)
    }
}

/// Slot a new member lands in when `target` is requested.
///
/// Targets past the end are clamped to `count + 1` (append).
pub fn clamp_insert(target: i32, count: i32) -> Result<i32, OrderError> {
    if target < 1 {
        return Err(OrderError::InvalidPosition(target));
    }
    Ok(target.min(count + 1))
}

/// Slot an existing member lands in when moved to `target` within its scope.
pub fn clamp_move(target: i32, count: i32) -> Result<i32, OrderError> {
    if target < 1 {
        return Err(OrderError::InvalidPosition(target));
    }
    Ok(target.min(count.max(1)))
}

/// Shift needed to move a member from `old` to `new` inside one scope.
///
/// Moving down the list pulls the members in between up by one; moving up
/// pushes them down. The moved member itself is outside the span and is
/// placed afterwards. Returns `None` when nothing moves.
pub fn shift_for_move(old: i32, new: i32) -> Option<(Span, i32)> {
    use std::cmp::Ordering;

    match new.cmp(&old) {
        Ordering::Greater => Some((Span::between(old + 1, new), -1)),
        Ordering::Less => Some((Span::between(new, old - 1), 1)),
        Ordering::Equal => None,
    }
}

/// Final member order for a bulk reorder.
///
/// `current` is the scope's live members in position order. Every requested
/// id must belong to the scope and appear once. Members the request leaves
/// out keep their relative order and follow the listed ones.
pub fn resolve_reorder<I>(current: &[I], requested: &[I]) -> Result<Vec<I>, OrderError>
where
    I: Copy + Eq + Hash + ToString,
{
    let members: HashSet<I> = current.iter().copied().collect();
    let mut seen = HashSet::with_capacity(requested.len());

    for id in requested {
        if !members.contains(id) {
            return Err(OrderError::ForeignItem(id.to_string()));
        }
        if !seen.insert(*id) {
            return Err(OrderError::DuplicateItem(id.to_string()));
        }
    }

    let mut resolved = requested.to_vec();
    resolved.extend(current.iter().filter(|id| !seen.contains(id)).copied());
    Ok(resolved)
}
