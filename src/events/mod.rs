//! Events, actions, and triggers
//!
//! An [`Event`] is a named occurrence that owns actions; an
//! [`EventTrigger`] is a condition source causing one or more events,
//! classified at registration time as a discrete Timer, a continuous
//! Witness, or plain (neither). Actions are Report (read-only) or Change
//! (may mutate state and request termination).

mod event;
mod id;
mod trigger;
mod witness;

pub use event::*;
pub use id::*;
pub use trigger::*;
pub use witness::*;
