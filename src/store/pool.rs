//! Free-list slot pool for run-time trigger sets

use crate::events::EventTrigger;

/// Slot-reuse pool keyed by dense index with a free list.
///
/// Intended for objects that come and go at run time, where index stability
/// for the surviving entries matters more than dense occupancy. Adopting
/// reuses a free slot in O(1) if one exists; removing the last slot shrinks
/// the store, removing an interior slot tombstones it onto the free list.
#[derive(Debug, Clone)]
pub struct SlotPool<T> {
    slots: Vec<Option<T>>,
    free: Vec<usize>,
}

impl<T> Default for SlotPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SlotPool<T> {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Take ownership of `value`, reusing a free slot if available, and
    /// return its index.
    pub fn adopt(&mut self, value: T) -> usize {
        match self.free.pop() {
            Some(index) => {
                debug_assert!(self.slots[index].is_none());
                self.slots[index] = Some(value);
                index
            }
            None => {
                self.slots.push(Some(value));
                self.slots.len() - 1
            }
        }
    }

    /// Remove the entry at `index`, returning it if the slot was live.
    ///
    /// Indices of all other live entries are unaffected.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        let value = self.slots.get_mut(index)?.take()?;
        if index + 1 == self.slots.len() {
            // Last slot: shrink rather than tombstone.
            self.slots.pop();
        } else {
            self.free.push(index);
        }
        Some(value)
    }

    /// Look up a live entry.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)?.as_ref()
    }

    /// Writable lookup of a live entry.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index)?.as_mut()
    }

    /// Number of slots, live or free
    #[inline]
    pub fn num_slots(&self) -> usize {
        self.slots.len()
    }

    /// Number of live entries
    pub fn num_live(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Iterate live entries with their indices.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (i, v)))
    }
}

/// Pool of run-time timer and witness triggers.
///
/// This is the storage for trigger sets held in per-simulation state rather
/// than system-wide topology: triggers here may be adopted and removed
/// while a simulation is in progress, so they live in a [`SlotPool`]
/// instead of the system's append-only arena. The caller supplies triggers
/// of the matching kind per pool.
#[derive(Debug, Clone, Default)]
pub struct TriggerPool {
    timers: SlotPool<EventTrigger>,
    witnesses: SlotPool<EventTrigger>,
}

impl TriggerPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt a run-time timer trigger, returning its pool index.
    pub fn adopt_timer(&mut self, timer: EventTrigger) -> usize {
        self.timers.adopt(timer)
    }

    /// Remove a run-time timer by pool index.
    pub fn remove_timer(&mut self, index: usize) -> Option<EventTrigger> {
        self.timers.remove(index)
    }

    /// Adopt a run-time witness trigger, returning its pool index.
    pub fn adopt_witness(&mut self, witness: EventTrigger) -> usize {
        self.witnesses.adopt(witness)
    }

    /// Remove a run-time witness by pool index.
    pub fn remove_witness(&mut self, index: usize) -> Option<EventTrigger> {
        self.witnesses.remove(index)
    }

    /// Live run-time timers
    pub fn timers(&self) -> impl Iterator<Item = (usize, &EventTrigger)> {
        self.timers.iter()
    }

    /// Live run-time witnesses
    pub fn witnesses(&self) -> impl Iterator<Item = (usize, &EventTrigger)> {
        self.witnesses.iter()
    }
}
