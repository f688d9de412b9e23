//! Append-only id arena

use crate::error::{EventError, IdKind};

/// Owning, append-only arena keyed by dense zero-based index.
///
/// Indices are assigned once, strictly increasing per adopt call, and never
/// reused within the arena's lifetime. Slots are held as `Option` so a
/// vacated slot is reportable distinctly from an out-of-range index; the
/// event core itself never vacates a slot.
#[derive(Debug, Clone)]
pub struct IdArena<T> {
    slots: Vec<Option<T>>,
    kind: IdKind,
}

impl<T> IdArena<T> {
    /// Create an empty arena whose errors name the given id kind.
    pub fn new(kind: IdKind) -> Self {
        Self {
            slots: Vec::new(),
            kind,
        }
    }

    /// Take ownership of `value` and return its dense index.
    pub fn adopt(&mut self, value: T) -> usize {
        let index = self.slots.len();
        self.slots.push(Some(value));
        index
    }

    /// Number of slots ever adopted (live or vacated)
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True if nothing has been adopted
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Look up by index, distinguishing out-of-range from vacated slots.
    pub fn get(&self, index: usize) -> Result<&T, EventError> {
        match self.slots.get(index) {
            None => Err(EventError::IdOutOfRange {
                kind: self.kind,
                index,
                count: self.slots.len(),
            }),
            Some(None) => Err(EventError::EmptySlot {
                kind: self.kind,
                index,
            }),
            Some(Some(value)) => Ok(value),
        }
    }

    /// Writable lookup with the same error causes as [`IdArena::get`].
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T, EventError> {
        let count = self.slots.len();
        match self.slots.get_mut(index) {
            None => Err(EventError::IdOutOfRange {
                kind: self.kind,
                index,
                count,
            }),
            Some(None) => Err(EventError::EmptySlot {
                kind: self.kind,
                index,
            }),
            Some(Some(value)) => Ok(value),
        }
    }

    /// True if `index` refers to a live entry. Never fails.
    pub fn has(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Some(_)))
    }

    /// Iterate live entries with their indices, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (i, v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adopt_assigns_dense_increasing_indices() {
        let mut arena = IdArena::new(IdKind::Event);
        assert_eq!(arena.adopt("a"), 0);
        assert_eq!(arena.adopt("b"), 1);
        assert_eq!(arena.adopt("c"), 2);
        assert_eq!(arena.len(), 3);
        assert_eq!(arena.get(1), Ok(&"b"));
    }

    #[test]
    fn out_of_range_is_reported_with_count() {
        let mut arena = IdArena::new(IdKind::EventTrigger);
        arena.adopt(7);
        assert_eq!(
            arena.get(3),
            Err(EventError::IdOutOfRange {
                kind: IdKind::EventTrigger,
                index: 3,
                count: 1
            })
        );
        assert!(!arena.has(3));
        assert!(arena.has(0));
    }
}
