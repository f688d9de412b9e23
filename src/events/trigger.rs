//! Event triggers: timers, witnesses, and plain condition sources

use crate::events::{EventId, Witness};
use crate::state::State;

/// Next-trigger-time function of a discrete Timer.
///
/// Stateless: the next absolute trigger time is a function of the state and
/// the time this timer last actually triggered.
pub trait TimerFn: Send + Sync {
    /// Absolute time at which this timer next wants to trigger.
    fn time_of_next_trigger(&self, state: &State, time_of_last_trigger: f64) -> f64;

    /// Duplicate this timer function behind a fresh box.
    fn clone_box(&self) -> Box<dyn TimerFn>;
}

impl<F> TimerFn for F
where
    F: Fn(&State, f64) -> f64 + Send + Sync + Clone + 'static,
{
    fn time_of_next_trigger(&self, state: &State, time_of_last_trigger: f64) -> f64 {
        self(state, time_of_last_trigger)
    }

    fn clone_box(&self) -> Box<dyn TimerFn> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn TimerFn> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// What kind of condition source a trigger is.
///
/// Fixed at registration: the topology partitioner consults this tag and
/// never re-decides a trigger's classification.
#[derive(Clone)]
pub enum TriggerSource {
    /// Neither a timer nor a witness (valid: the predefined lifecycle
    /// triggers are plain).
    Plain,
    /// Discrete timer
    Timer(Box<dyn TimerFn>),
    /// Continuous zero-crossing witness
    Witness(Witness),
}

impl std::fmt::Debug for TriggerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "Plain"),
            Self::Timer(_) => write!(f, "Timer"),
            Self::Witness(w) => f.debug_tuple("Witness").field(w).finish(),
        }
    }
}

/// A condition source causing one or more events.
///
/// Owns its occurrence counter and the list of event ids it causes. The
/// classification (timer / witness / plain) is part of the trigger's value
/// and never changes after construction.
#[derive(Debug, Clone)]
pub struct EventTrigger {
    description: String,
    events: Vec<EventId>,
    occurrence_count: u64,
    source: TriggerSource,
}

impl EventTrigger {
    /// Create an unclassified trigger.
    pub fn new_plain(description: impl Into<String>) -> Self {
        Self::with_source(description, TriggerSource::Plain)
    }

    /// Create a timer trigger from a next-time function.
    pub fn new_timer(description: impl Into<String>, timer: impl TimerFn + 'static) -> Self {
        Self::with_source(description, TriggerSource::Timer(Box::new(timer)))
    }

    /// Create a witness trigger.
    pub fn new_witness(description: impl Into<String>, witness: Witness) -> Self {
        Self::with_source(description, TriggerSource::Witness(witness))
    }

    fn with_source(description: impl Into<String>, source: TriggerSource) -> Self {
        Self {
            description: description.into(),
            events: Vec::new(),
            occurrence_count: 0,
            source,
        }
    }

    /// Description given at construction
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Causally link an event to this trigger.
    pub fn add_event(&mut self, event_id: EventId) {
        self.events.push(event_id);
    }

    /// Ids of the events this trigger causes, in link order
    pub fn event_ids(&self) -> &[EventId] {
        &self.events
    }

    /// The registration-time classification tag
    pub fn source(&self) -> &TriggerSource {
        &self.source
    }

    /// Timer capability, if this trigger is a timer
    pub fn timer(&self) -> Option<&dyn TimerFn> {
        match &self.source {
            TriggerSource::Timer(t) => Some(t.as_ref()),
            _ => None,
        }
    }

    /// Witness capability, if this trigger is a witness
    pub fn witness(&self) -> Option<&Witness> {
        match &self.source {
            TriggerSource::Witness(w) => Some(w),
            _ => None,
        }
    }

    /// True if this trigger is a timer
    pub fn is_timer(&self) -> bool {
        matches!(self.source, TriggerSource::Timer(_))
    }

    /// True if this trigger is a witness
    pub fn is_witness(&self) -> bool {
        matches!(self.source, TriggerSource::Witness(_))
    }

    /// How many times this trigger has fired
    pub fn occurrence_count(&self) -> u64 {
        self.occurrence_count
    }

    pub(crate) fn note_occurrence(&mut self) {
        self.occurrence_count += 1;
    }
}
