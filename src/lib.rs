//! SimEvents - hybrid event scheduling core for multibody simulation
//!
//! The component of a continuous-time simulation engine that reconciles
//! discrete events (initialization, termination, time advance, user state
//! changes) with continuous witness functions (zero-crossing detectors for
//! contact transitions, joint-limit stops) during numerical integration.
//!
//! # Architecture
//!
//! - [`EventSubsystem`](subsystem::EventSubsystem) owns all events and
//!   triggers, assigns stable ids, and rebuilds its timer/witness
//!   classification cache at every topology realization.
//! - The external integrator asks
//!   [`find_next_scheduled_event_times`](subsystem::EventSubsystem::find_next_scheduled_event_times)
//!   when to stop, localizes witness crossings itself, then reports
//!   simultaneous firings through
//!   [`note_event_occurrence`](subsystem::EventSubsystem::note_event_occurrence)
//!   and dispatches the aggregated actions.
//! - The core classifies, schedules, and dispatches only: no root
//!   localization, no step-size control, no persistence.
//!
//! # Example
//!
//! ```rust,ignore
//! use simevents::prelude::*;
//!
//! let mut sub = EventSubsystem::new();
//! let reg = sub.adopt_triggered_event_handler(my_contact_handler);
//! sub.realize_topology();
//!
//! // ... integrator detects a sign change and localizes it ...
//! let occurrence = sub.note_event_occurrence(&[reg.trigger_id])?;
//! let result = sub.perform_event_change_actions(&mut state, &occurrence.triggered_events)?;
//! if result.should_terminate() { /* stop the run */ }
//! ```

pub mod adapters;
pub mod error;
pub mod events;
pub mod stage;
pub mod state;
pub mod store;
pub mod subsystem;
pub mod utils;

pub use adapters::{
    EventRegistration, ScheduledEventHandler, ScheduledEventReporter, TriggeredEventHandler,
    TriggeredEventReporter, WitnessTriggerInfo,
};
pub use error::{EventError, IdKind};
pub use events::{
    change_fn, report_fn, ActionKind, ActionOutcome, Direction, Event, EventAction,
    EventChangeResult, EventId, EventTrigger, EventTriggerId, Polarity, Temporality, TimerFn,
    TimerIndex, TriggerSource, Witness, WitnessFn, WitnessIndex,
};
pub use stage::{Stage, StageVersion, StageVersions};
pub use state::State;
pub use store::{IdArena, SlotPool, TriggerPool};
pub use subsystem::{EventSubsystem, EventsAndCauses, NextEventTimes, OccurrenceReport};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::{
        EventRegistration, ScheduledEventHandler, ScheduledEventReporter, TriggeredEventHandler,
        TriggeredEventReporter, WitnessTriggerInfo,
    };
    pub use crate::error::EventError;
    pub use crate::events::{
        change_fn, report_fn, ActionKind, ActionOutcome, Direction, Event, EventAction,
        EventChangeResult, EventId, EventTrigger, EventTriggerId, Witness, WitnessFn,
    };
    pub use crate::stage::Stage;
    pub use crate::state::State;
    pub use crate::subsystem::{EventSubsystem, NextEventTimes, OccurrenceReport};
}
