//! Storage disciplines for events and triggers
//!
//! Two distinct generic containers behind one minimal surface (adopt,
//! lookup, remove): an append-only arena for topology-time objects whose
//! ids must never be reused, and a free-list slot pool for objects that may
//! be adopted and removed dynamically at run time.

mod arena;
mod pool;

pub use arena::IdArena;
pub use pool::{SlotPool, TriggerPool};
