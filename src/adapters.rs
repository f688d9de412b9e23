//! Adapters binding user handler/reporter objects into events and triggers
//!
//! A handler or reporter is a single user object carrying both the firing
//! condition (a next-time query for scheduled kinds, a scalar witness
//! function for triggered kinds) and the response (`handle_event`).
//! Adoption splits it into an Event with one Action plus a Timer or
//! Witness trigger, registers all of them, and hands back the assigned
//! ids as an explicit registration handle.

use std::sync::Arc;

use crate::events::{
    ActionKind, ActionOutcome, Direction, Event, EventAction, EventId, EventTrigger,
    EventTriggerId, TimerFn, Witness, WitnessFn,
};
use crate::stage::Stage;
use crate::state::State;
use crate::subsystem::EventSubsystem;
use crate::utils::constants::DEFAULT_LOCALIZATION_WINDOW;

/// Ids assigned when a handler or reporter is adopted.
///
/// Returned by value; the caller stores it and uses it to find the
/// event/trigger later. Nothing is written back onto the supplied object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRegistration {
    /// Id of the event created for the adopted object
    pub event_id: EventId,
    /// Id of the timer or witness trigger created for it
    pub trigger_id: EventTriggerId,
}

/// Witness configuration supplied by a triggered handler/reporter.
#[derive(Debug, Clone, Copy)]
pub struct WitnessTriggerInfo {
    /// Fire on negative-to-positive crossings
    pub trigger_on_rising: bool,
    /// Fire on positive-to-negative crossings
    pub trigger_on_falling: bool,
    /// Accuracy-relative time window for localizing the crossing
    pub localization_window: f64,
}

impl Default for WitnessTriggerInfo {
    fn default() -> Self {
        Self {
            trigger_on_rising: true,
            trigger_on_falling: true,
            localization_window: DEFAULT_LOCALIZATION_WINDOW,
        }
    }
}

impl WitnessTriggerInfo {
    /// Transition direction encoded by the rising/falling flags.
    fn direction(&self) -> Direction {
        if self.trigger_on_rising {
            if self.trigger_on_falling {
                Direction::RisingAndFalling
            } else {
                Direction::Rising
            }
        } else {
            Direction::Falling
        }
    }
}

/// A user object fired at discrete times it announces in advance, whose
/// response may change the state.
pub trait ScheduledEventHandler: Send + Sync {
    /// Next absolute time this handler wants to fire.
    ///
    /// `include_current_time` is true when the current time itself is an
    /// acceptable answer (the handler has not already fired at it).
    fn next_event_time(&self, state: &State, include_current_time: bool) -> f64;

    /// Respond to the event. May mutate the state.
    fn handle_event(&self, state: &mut State, accuracy: f64) -> ActionOutcome;

    /// Description for the created event
    fn event_description(&self) -> &str {
        ""
    }
}

/// A user object fired at discrete times, whose response is read-only.
pub trait ScheduledEventReporter: Send + Sync {
    /// Next absolute time this reporter wants to fire.
    fn next_event_time(&self, state: &State, include_current_time: bool) -> f64;

    /// Respond to the event without mutating the state.
    fn handle_event(&self, state: &State);

    /// Description for the created event
    fn event_description(&self) -> &str {
        ""
    }
}

/// A user object fired when its witness function crosses zero, whose
/// response may change the state.
pub trait TriggeredEventHandler: Send + Sync {
    /// The continuous witness function.
    fn value(&self, state: &State) -> f64;

    /// Stage the witness function depends on.
    fn required_stage(&self) -> Stage;

    /// Direction flags and localization window for the witness.
    fn trigger_info(&self) -> WitnessTriggerInfo {
        WitnessTriggerInfo::default()
    }

    /// Respond to the event. May mutate the state.
    fn handle_event(&self, state: &mut State, accuracy: f64) -> ActionOutcome;

    /// Description for the created event
    fn event_description(&self) -> &str {
        ""
    }
}

/// A user object fired when its witness function crosses zero, whose
/// response is read-only.
pub trait TriggeredEventReporter: Send + Sync {
    /// The continuous witness function.
    fn value(&self, state: &State) -> f64;

    /// Stage the witness function depends on.
    fn required_stage(&self) -> Stage;

    /// Direction flags and localization window for the witness.
    fn trigger_info(&self) -> WitnessTriggerInfo {
        WitnessTriggerInfo::default()
    }

    /// Respond to the event without mutating the state.
    fn handle_event(&self, state: &State);

    /// Description for the created event
    fn event_description(&self) -> &str {
        ""
    }
}

fn event_description_or(description: &str, default: &str) -> String {
    if description.is_empty() {
        default.to_string()
    } else {
        description.to_string()
    }
}

//------------------------------------------------------------------------
// Wrappers binding the user objects into actions, timers, and witnesses
//------------------------------------------------------------------------

#[derive(Clone)]
struct ScheduledHandlerAction(Arc<dyn ScheduledEventHandler>);

impl EventAction for ScheduledHandlerAction {
    fn kind(&self) -> ActionKind {
        ActionKind::Change
    }

    fn change(&self, state: &mut State, _causes: &[EventTriggerId]) -> ActionOutcome {
        let accuracy = state.accuracy();
        self.0.handle_event(state, accuracy)
    }

    fn clone_box(&self) -> Box<dyn EventAction> {
        Box::new(self.clone())
    }
}

#[derive(Clone)]
struct TriggeredHandlerAction(Arc<dyn TriggeredEventHandler>);

impl EventAction for TriggeredHandlerAction {
    fn kind(&self) -> ActionKind {
        ActionKind::Change
    }

    fn change(&self, state: &mut State, _causes: &[EventTriggerId]) -> ActionOutcome {
        let accuracy = state.accuracy();
        self.0.handle_event(state, accuracy)
    }

    fn clone_box(&self) -> Box<dyn EventAction> {
        Box::new(self.clone())
    }
}

#[derive(Clone)]
struct ScheduledReporterAction(Arc<dyn ScheduledEventReporter>);

impl EventAction for ScheduledReporterAction {
    fn kind(&self) -> ActionKind {
        ActionKind::Report
    }

    fn report(&self, state: &State, _causes: &[EventTriggerId]) {
        self.0.handle_event(state);
    }

    fn clone_box(&self) -> Box<dyn EventAction> {
        Box::new(self.clone())
    }
}

#[derive(Clone)]
struct TriggeredReporterAction(Arc<dyn TriggeredEventReporter>);

impl EventAction for TriggeredReporterAction {
    fn kind(&self) -> ActionKind {
        ActionKind::Report
    }

    fn report(&self, state: &State, _causes: &[EventTriggerId]) {
        self.0.handle_event(state);
    }

    fn clone_box(&self) -> Box<dyn EventAction> {
        Box::new(self.clone())
    }
}

#[derive(Clone)]
struct ScheduledHandlerTimer(Arc<dyn ScheduledEventHandler>);

impl TimerFn for ScheduledHandlerTimer {
    fn time_of_next_trigger(&self, state: &State, time_of_last_trigger: f64) -> f64 {
        self.0
            .next_event_time(state, state.time() > time_of_last_trigger)
    }

    fn clone_box(&self) -> Box<dyn TimerFn> {
        Box::new(self.clone())
    }
}

#[derive(Clone)]
struct ScheduledReporterTimer(Arc<dyn ScheduledEventReporter>);

impl TimerFn for ScheduledReporterTimer {
    fn time_of_next_trigger(&self, state: &State, time_of_last_trigger: f64) -> f64 {
        self.0
            .next_event_time(state, state.time() > time_of_last_trigger)
    }

    fn clone_box(&self) -> Box<dyn TimerFn> {
        Box::new(self.clone())
    }
}

#[derive(Clone)]
struct TriggeredHandlerWitness(Arc<dyn TriggeredEventHandler>);

impl WitnessFn for TriggeredHandlerWitness {
    fn value(&self, state: &State, _deriv_order: usize) -> f64 {
        self.0.value(state)
    }

    fn depends_on_stage(&self, _deriv_order: usize) -> Stage {
        self.0.required_stage()
    }

    fn clone_box(&self) -> Box<dyn WitnessFn> {
        Box::new(self.clone())
    }
}

#[derive(Clone)]
struct TriggeredReporterWitness(Arc<dyn TriggeredEventReporter>);

impl WitnessFn for TriggeredReporterWitness {
    fn value(&self, state: &State, _deriv_order: usize) -> f64 {
        self.0.value(state)
    }

    fn depends_on_stage(&self, _deriv_order: usize) -> Stage {
        self.0.required_stage()
    }

    fn clone_box(&self) -> Box<dyn WitnessFn> {
        Box::new(self.clone())
    }
}

//------------------------------------------------------------------------
// Adoption
//------------------------------------------------------------------------

impl EventSubsystem {
    /// Adopt a scheduled handler: one event with a Change action plus a
    /// timer trigger, both delegating to the handler.
    pub fn adopt_scheduled_event_handler(
        &mut self,
        handler: Arc<dyn ScheduledEventHandler>,
    ) -> EventRegistration {
        let description =
            event_description_or(handler.event_description(), "EventHandler Event");
        let mut event = Event::new(description);
        event.adopt_action(Box::new(ScheduledHandlerAction(handler.clone())));
        let event_id = self.adopt_event(event);

        let mut timer = EventTrigger::new_timer(
            "ScheduledEventHandler timer",
            ScheduledHandlerTimer(handler),
        );
        timer.add_event(event_id);
        let trigger_id = self.adopt_event_trigger(timer);

        EventRegistration {
            event_id,
            trigger_id,
        }
    }

    /// Adopt a scheduled reporter: one event with a Report action plus a
    /// timer trigger.
    pub fn adopt_scheduled_event_reporter(
        &mut self,
        reporter: Arc<dyn ScheduledEventReporter>,
    ) -> EventRegistration {
        let description =
            event_description_or(reporter.event_description(), "EventReporter Event");
        let mut event = Event::new(description);
        event.adopt_action(Box::new(ScheduledReporterAction(reporter.clone())));
        let event_id = self.adopt_event(event);

        let mut timer = EventTrigger::new_timer(
            "ScheduledEventReporter timer",
            ScheduledReporterTimer(reporter),
        );
        timer.add_event(event_id);
        let trigger_id = self.adopt_event_trigger(timer);

        EventRegistration {
            event_id,
            trigger_id,
        }
    }

    /// Adopt a triggered handler: one event with a Change action plus a
    /// witness trigger whose direction and localization window come from
    /// the handler's trigger info. The witness reports zero time
    /// derivatives.
    pub fn adopt_triggered_event_handler(
        &mut self,
        handler: Arc<dyn TriggeredEventHandler>,
    ) -> EventRegistration {
        let description =
            event_description_or(handler.event_description(), "EventHandler Event");
        let mut event = Event::new(description);
        event.adopt_action(Box::new(TriggeredHandlerAction(handler.clone())));
        let event_id = self.adopt_event(event);

        let info = handler.trigger_info();
        let witness = Witness::new(info.direction(), TriggeredHandlerWitness(handler))
            .with_localization_window(info.localization_window);
        let mut trigger = EventTrigger::new_witness("TriggeredEventHandler witness", witness);
        trigger.add_event(event_id);
        let trigger_id = self.adopt_event_trigger(trigger);

        EventRegistration {
            event_id,
            trigger_id,
        }
    }

    /// Adopt a triggered reporter: one event with a Report action plus a
    /// witness trigger.
    pub fn adopt_triggered_event_reporter(
        &mut self,
        reporter: Arc<dyn TriggeredEventReporter>,
    ) -> EventRegistration {
        let description =
            event_description_or(reporter.event_description(), "EventReporter Event");
        let mut event = Event::new(description);
        event.adopt_action(Box::new(TriggeredReporterAction(reporter.clone())));
        let event_id = self.adopt_event(event);

        let info = reporter.trigger_info();
        let witness = Witness::new(info.direction(), TriggeredReporterWitness(reporter))
            .with_localization_window(info.localization_window);
        let mut trigger = EventTrigger::new_witness("TriggeredEventReporter witness", witness);
        trigger.add_event(event_id);
        let trigger_id = self.adopt_event_trigger(trigger);

        EventRegistration {
            event_id,
            trigger_id,
        }
    }
}
