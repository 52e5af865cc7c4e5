//! Identifier allocation for temporary elements.
//!
//! A merge call owns one [`IdGenerator`]; each logical change inside it owns
//! one [`TempIdMap`]. Sharing the generator keeps generated ids unique across
//! changes while the per-change map keeps temporary ids local.

use std::collections::HashMap;

/// Strictly decreasing sequence of negative identifiers starting at -1.
///
/// # Examples
/// ```
/// use change_merger_core::IdGenerator;
///
/// let mut generator = IdGenerator::new();
/// assert_eq!(generator.next_id(), -1);
/// assert_eq!(generator.next_id(), -2);
/// ```
#[derive(Debug)]
pub struct IdGenerator {
    next: i64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self { next: -1 }
    }
}

impl IdGenerator {
    /// A generator whose first id is -1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the next identifier.
    pub fn next_id(&mut self) -> i64 {
        let id = self.next;
        self.next -= 1;
        id
    }
}

/// Temporary-to-generated identifier table for one logical change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TempIdMap {
    entries: HashMap<i64, i64>,
}

impl TempIdMap {
    /// Record that `temporary` was replaced by `generated`.
    pub fn insert(&mut self, temporary: i64, generated: i64) {
        self.entries.insert(temporary, generated);
    }

    /// The generated replacement of `temporary`, if one was recorded.
    pub fn get(&self, temporary: i64) -> Option<i64> {
        self.entries.get(&temporary).copied()
    }

    /// The mapped value when `id` was remapped, otherwise `id` unchanged.
    pub fn resolve_or_keep(&self, id: i64) -> i64 {
        self.get(id).unwrap_or(id)
    }

    /// Resolve `id` to a reportable identifier.
    ///
    /// Non-negative ids resolve to themselves; negative ids resolve only when
    /// they were remapped.
    pub fn resolve(&self, id: i64) -> Option<i64> {
        if id >= 0 { Some(id) } else { self.get(id) }
    }

    /// The first id in `ids` that [`resolve`](Self::resolve) rejects.
    pub fn first_unresolved<I>(&self, ids: I) -> Option<i64>
    where
        I: IntoIterator<Item = i64>,
    {
        ids.into_iter().find(|id| self.resolve(*id).is_none())
    }

    /// Number of remapped identifiers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing was remapped.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
