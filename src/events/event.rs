//! Events and their actions

use crate::events::EventTriggerId;
use crate::stage::Stage;
use crate::state::State;

/// What an action is permitted to do when its event occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Read-only look at the state (output, telemetry)
    Report,
    /// May mutate the state and request termination
    Change,
}

/// Per-action exit status reported by a change action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionOutcome {
    /// The action completed and the simulation may continue.
    #[default]
    Succeeded,
    /// The action requests that the simulation stop after this step.
    ShouldTerminate,
}

/// An action owned by exactly one [`Event`].
///
/// The kind is a capability query fixed at construction; the dispatcher
/// never inspects the concrete type. `clone_box` gives the stored
/// interface an explicit duplication capability so owning containers can
/// be cloned.
pub trait EventAction: Send + Sync {
    /// Report or Change
    fn kind(&self) -> ActionKind;

    /// Invoked for Report actions. Must not mutate simulation state.
    fn report(&self, _state: &State, _causes: &[EventTriggerId]) {}

    /// Invoked for Change actions. May mutate the state.
    fn change(&self, _state: &mut State, _causes: &[EventTriggerId]) -> ActionOutcome {
        ActionOutcome::Succeeded
    }

    /// Duplicate this action behind a fresh box.
    fn clone_box(&self) -> Box<dyn EventAction>;
}

impl Clone for Box<dyn EventAction> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Report action wrapping a closure.
#[derive(Clone)]
struct ReportFn<F>(F);

impl<F> EventAction for ReportFn<F>
where
    F: Fn(&State, &[EventTriggerId]) + Send + Sync + Clone + 'static,
{
    fn kind(&self) -> ActionKind {
        ActionKind::Report
    }

    fn report(&self, state: &State, causes: &[EventTriggerId]) {
        (self.0)(state, causes);
    }

    fn clone_box(&self) -> Box<dyn EventAction> {
        Box::new(self.clone())
    }
}

/// Change action wrapping a closure.
#[derive(Clone)]
struct ChangeFn<F>(F);

impl<F> EventAction for ChangeFn<F>
where
    F: Fn(&mut State, &[EventTriggerId]) -> ActionOutcome + Send + Sync + Clone + 'static,
{
    fn kind(&self) -> ActionKind {
        ActionKind::Change
    }

    fn change(&self, state: &mut State, causes: &[EventTriggerId]) -> ActionOutcome {
        (self.0)(state, causes)
    }

    fn clone_box(&self) -> Box<dyn EventAction> {
        Box::new(self.clone())
    }
}

/// Make a Report action from a closure.
pub fn report_fn<F>(f: F) -> Box<dyn EventAction>
where
    F: Fn(&State, &[EventTriggerId]) + Send + Sync + Clone + 'static,
{
    Box::new(ReportFn(f))
}

/// Make a Change action from a closure.
pub fn change_fn<F>(f: F) -> Box<dyn EventAction>
where
    F: Fn(&mut State, &[EventTriggerId]) -> ActionOutcome + Send + Sync + Clone + 'static,
{
    Box::new(ChangeFn(f))
}

/// A named occurrence that owns zero or more actions.
///
/// Identity is fixed at adoption; the occurrence counter is observational
/// telemetry, bumped once per aggregated batch the event appears in.
#[derive(Clone)]
pub struct Event {
    description: String,
    actions: Vec<Box<dyn EventAction>>,
    occurrence_count: u64,
}

impl Event {
    /// Create an event with a human-readable description and no actions.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            actions: Vec::new(),
            occurrence_count: 0,
        }
    }

    /// Description given at construction
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Take ownership of an action; returns its index within this event.
    pub fn adopt_action(&mut self, action: Box<dyn EventAction>) -> usize {
        self.actions.push(action);
        self.actions.len() - 1
    }

    /// Number of owned actions
    pub fn num_actions(&self) -> usize {
        self.actions.len()
    }

    /// True if any owned action is a Change action
    pub fn has_change_action(&self) -> bool {
        self.actions.iter().any(|a| a.kind() == ActionKind::Change)
    }

    /// True if any owned action is a Report action
    pub fn has_report_action(&self) -> bool {
        self.actions.iter().any(|a| a.kind() == ActionKind::Report)
    }

    /// How many aggregated batches this event has appeared in
    pub fn occurrence_count(&self) -> u64 {
        self.occurrence_count
    }

    pub(crate) fn note_occurrence(&mut self) {
        self.occurrence_count += 1;
    }

    /// Run every Report action, passing the triggers that caused this
    /// occurrence.
    pub fn perform_report_actions(&self, state: &State, causes: &[EventTriggerId]) {
        for action in &self.actions {
            if action.kind() == ActionKind::Report {
                action.report(state, causes);
            }
        }
    }

    /// Run every Change action, accumulating statuses into `result`.
    pub fn perform_change_actions(
        &self,
        state: &mut State,
        causes: &[EventTriggerId],
        result: &mut EventChangeResult,
    ) {
        for action in &self.actions {
            if action.kind() == ActionKind::Change {
                result.report_exit_status(action.change(state, causes));
            }
        }
    }
}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("description", &self.description)
            .field("num_actions", &self.actions.len())
            .field("occurrence_count", &self.occurrence_count)
            .finish()
    }
}

/// Accumulated result of a batch of change actions.
///
/// The exit status is a one-way latch: once any action in the batch
/// reports [`ActionOutcome::ShouldTerminate`], the aggregate stays
/// `ShouldTerminate` regardless of later actions.
#[derive(Debug, Clone, Default)]
pub struct EventChangeResult {
    exit_status: ActionOutcome,
    lowest_modified_stage: Option<Stage>,
}

impl EventChangeResult {
    /// Fold one action's status into the aggregate.
    pub fn report_exit_status(&mut self, outcome: ActionOutcome) {
        if outcome == ActionOutcome::ShouldTerminate {
            self.exit_status = ActionOutcome::ShouldTerminate;
        }
    }

    /// Aggregate exit status for the whole batch
    pub fn exit_status(&self) -> ActionOutcome {
        self.exit_status
    }

    /// Convenience query on the aggregate status
    pub fn should_terminate(&self) -> bool {
        self.exit_status == ActionOutcome::ShouldTerminate
    }

    pub(crate) fn set_lowest_modified_stage(&mut self, stage: Option<Stage>) {
        self.lowest_modified_stage = stage;
    }

    /// Lowest (most fundamental) stage whose version the batch changed,
    /// or `None` if no stage was invalidated. Tells the caller how much
    /// cached downstream computation must be re-realized.
    pub fn lowest_modified_stage(&self) -> Option<Stage> {
        self.lowest_modified_stage
    }
}
