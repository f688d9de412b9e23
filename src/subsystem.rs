//! The event subsystem: registry, partitioner, scheduler, aggregator,
//! dispatcher
//!
//! One instance lives per system. Events and triggers are registered
//! during model construction; `realize_topology` rebuilds the derived
//! classification cache; during time stepping the integrator asks for the
//! next scheduled event times, localizes witness crossings externally,
//! then reports simultaneous firings and dispatches the resulting actions.

use tracing::debug;

use crate::error::{EventError, IdKind};
use crate::events::{
    Event, EventChangeResult, EventId, EventTrigger, EventTriggerId, TriggerSource, WitnessIndex,
};
use crate::stage::Stage;
use crate::state::State;
use crate::store::IdArena;
use crate::utils::constants::MAX_WITNESS_DERIVS;

/// Deduplicated (event, causing triggers) list produced from a
/// simultaneous-firing set, in first-seen order.
pub type EventsAndCauses = Vec<(EventId, Vec<EventTriggerId>)>;

/// Result of noting a batch of simultaneous trigger firings.
#[derive(Debug, Clone, Default)]
pub struct OccurrenceReport {
    /// One entry per distinct caused event, first-seen order, with every
    /// trigger that caused it in firing order.
    pub triggered_events: EventsAndCauses,
    /// Unrecognized event ids encountered, deduplicated, in order of
    /// first appearance. These never abort the batch.
    pub ignored_event_ids: Vec<EventId>,
}

/// Next discrete trigger times, computed separately for report-only and
/// state-changing timers, with exact ties grouped.
#[derive(Debug, Clone)]
pub struct NextEventTimes {
    /// Earliest next time any report-only timer wants to trigger
    pub time_of_next_report: f64,
    /// Every report-only timer tied at that time, in discovery order
    pub report_timers: Vec<EventTriggerId>,
    /// Earliest next time any change-driving timer wants to trigger
    pub time_of_next_change: f64,
    /// Every change-driving timer tied at that time, in discovery order
    pub change_timers: Vec<EventTriggerId>,
}

/// Derived classification of the registered triggers.
///
/// Rebuilt from scratch at every topology realization; a cache, not
/// authoritative state.
#[derive(Debug, Clone, Default)]
struct TopologyCache {
    timers: Vec<EventTriggerId>,
    witnesses: Vec<EventTriggerId>,
    // Witness indices bucketed by (depends-on stage, derivative order) so
    // realization code evaluates only the witnesses whose stage is
    // currently satisfied, up to the derivative order actually needed.
    witnesses_by_stage: [[Vec<WitnessIndex>; MAX_WITNESS_DERIVS + 1]; Stage::COUNT],
}

impl TopologyCache {
    fn clear(&mut self) {
        self.timers.clear();
        self.witnesses.clear();
        for stage in &mut self.witnesses_by_stage {
            for bucket in stage {
                bucket.clear();
            }
        }
    }
}

/// Owner of all events and triggers for one system instance.
///
/// Single-threaded, cooperative: registry mutation is expected only during
/// model construction and topology realization, never concurrently with
/// simulation stepping.
#[derive(Debug, Clone)]
pub struct EventSubsystem {
    events: IdArena<Event>,
    triggers: IdArena<EventTrigger>,
    cache: TopologyCache,

    initialization_event_id: EventId,
    time_advanced_event_id: EventId,
    termination_event_id: EventId,
    extreme_value_isolated_event_id: EventId,

    initialization_trigger_id: EventTriggerId,
    time_advanced_trigger_id: EventTriggerId,
    termination_trigger_id: EventTriggerId,
}

impl EventSubsystem {
    /// Create a subsystem with the predefined events and triggers
    /// registered.
    pub fn new() -> Self {
        let mut sub = Self {
            events: IdArena::new(IdKind::Event),
            triggers: IdArena::new(IdKind::EventTrigger),
            cache: TopologyCache::default(),
            initialization_event_id: EventId::INVALID,
            time_advanced_event_id: EventId::INVALID,
            termination_event_id: EventId::INVALID,
            extreme_value_isolated_event_id: EventId::INVALID,
            initialization_trigger_id: EventTriggerId::INVALID,
            time_advanced_trigger_id: EventTriggerId::INVALID,
            termination_trigger_id: EventTriggerId::INVALID,
        };

        sub.initialization_event_id = sub.adopt_event(Event::new("Initialization"));
        sub.time_advanced_event_id = sub.adopt_event(Event::new("TimeAdvanced"));
        sub.termination_event_id = sub.adopt_event(Event::new("Termination"));
        sub.extreme_value_isolated_event_id =
            sub.adopt_event(Event::new("ExtremeValueIsolated"));

        let mut trigger = EventTrigger::new_plain("Initialization trigger");
        trigger.add_event(sub.initialization_event_id);
        sub.initialization_trigger_id = sub.adopt_event_trigger(trigger);

        let mut trigger = EventTrigger::new_plain("TimeAdvanced trigger");
        trigger.add_event(sub.time_advanced_event_id);
        sub.time_advanced_trigger_id = sub.adopt_event_trigger(trigger);

        let mut trigger = EventTrigger::new_plain("Termination trigger");
        trigger.add_event(sub.termination_event_id);
        sub.termination_trigger_id = sub.adopt_event_trigger(trigger);

        sub
    }

    //--------------------------------------------------------------------
    // Registry
    //--------------------------------------------------------------------

    /// Take ownership of an event, returning its unique id.
    pub fn adopt_event(&mut self, event: Event) -> EventId {
        EventId::new(self.events.adopt(event))
    }

    /// Take ownership of a trigger, returning its unique id.
    pub fn adopt_event_trigger(&mut self, trigger: EventTrigger) -> EventTriggerId {
        EventTriggerId::new(self.triggers.adopt(trigger))
    }

    /// Number of registered events
    pub fn num_events(&self) -> usize {
        self.events.len()
    }

    /// Number of registered triggers
    pub fn num_event_triggers(&self) -> usize {
        self.triggers.len()
    }

    /// Look up an event, with a distinct error per failure cause.
    pub fn get_event(&self, id: EventId) -> Result<&Event, EventError> {
        if !id.is_valid() {
            return Err(EventError::UninitializedId(IdKind::Event));
        }
        self.events.get(id.index())
    }

    /// Writable event lookup with the same error causes.
    pub fn get_event_mut(&mut self, id: EventId) -> Result<&mut Event, EventError> {
        if !id.is_valid() {
            return Err(EventError::UninitializedId(IdKind::Event));
        }
        self.events.get_mut(id.index())
    }

    /// True if `id` names a registered event. Never fails.
    pub fn has_event(&self, id: EventId) -> bool {
        id.is_valid() && self.events.has(id.index())
    }

    /// Look up a trigger, with a distinct error per failure cause.
    pub fn get_event_trigger(&self, id: EventTriggerId) -> Result<&EventTrigger, EventError> {
        if !id.is_valid() {
            return Err(EventError::UninitializedId(IdKind::EventTrigger));
        }
        self.triggers.get(id.index())
    }

    /// Writable trigger lookup with the same error causes.
    pub fn get_event_trigger_mut(
        &mut self,
        id: EventTriggerId,
    ) -> Result<&mut EventTrigger, EventError> {
        if !id.is_valid() {
            return Err(EventError::UninitializedId(IdKind::EventTrigger));
        }
        self.triggers.get_mut(id.index())
    }

    /// True if `id` names a registered trigger. Never fails.
    pub fn has_event_trigger(&self, id: EventTriggerId) -> bool {
        id.is_valid() && self.triggers.has(id.index())
    }

    //--------------------------------------------------------------------
    // Predefined ids
    //--------------------------------------------------------------------

    /// Id of the predefined Initialization event
    pub fn initialization_event_id(&self) -> EventId {
        self.initialization_event_id
    }

    /// Id of the predefined TimeAdvanced event
    pub fn time_advanced_event_id(&self) -> EventId {
        self.time_advanced_event_id
    }

    /// Id of the predefined Termination event
    pub fn termination_event_id(&self) -> EventId {
        self.termination_event_id
    }

    /// Id of the predefined ExtremeValueIsolated event
    pub fn extreme_value_isolated_event_id(&self) -> EventId {
        self.extreme_value_isolated_event_id
    }

    /// Id of the predefined Initialization trigger
    pub fn initialization_trigger_id(&self) -> EventTriggerId {
        self.initialization_trigger_id
    }

    /// Id of the predefined TimeAdvanced trigger
    pub fn time_advanced_trigger_id(&self) -> EventTriggerId {
        self.time_advanced_trigger_id
    }

    /// Id of the predefined Termination trigger
    pub fn termination_trigger_id(&self) -> EventTriggerId {
        self.termination_trigger_id
    }

    //--------------------------------------------------------------------
    // Topology partitioner
    //--------------------------------------------------------------------

    /// Clear and rebuild the derived classification cache.
    ///
    /// Every registered trigger is re-discovered from its registration
    /// tag: timers get dense timer indices in id order, witnesses get
    /// dense witness indices and are bucketed by (depends-on stage,
    /// derivative order) for `0..=min(MAX_WITNESS_DERIVS, declared)`.
    /// Plain triggers are left unclassified.
    pub fn realize_topology(&mut self) {
        self.cache.clear();

        for (index, trigger) in self.triggers.iter() {
            let id = EventTriggerId::new(index);
            match trigger.source() {
                TriggerSource::Timer(_) => {
                    self.cache.timers.push(id);
                }
                TriggerSource::Witness(witness) => {
                    let witness_index = WitnessIndex(self.cache.witnesses.len());
                    self.cache.witnesses.push(id);
                    let nderivs = witness.num_time_derivatives().min(MAX_WITNESS_DERIVS);
                    for deriv in 0..=nderivs {
                        let stage = witness.depends_on_stage(deriv);
                        self.cache.witnesses_by_stage[stage.index()][deriv].push(witness_index);
                    }
                }
                TriggerSource::Plain => {}
            }
        }

        debug!(
            num_timers = self.cache.timers.len(),
            num_witnesses = self.cache.witnesses.len(),
            "realized event topology"
        );
    }

    /// Triggers classified as timers at the last topology realization,
    /// in dense [`TimerIndex`](crate::events::TimerIndex) order.
    pub fn find_active_event_timers(&self) -> &[EventTriggerId] {
        // TODO: merge run-time timers from the state's TriggerPool.
        &self.cache.timers
    }

    /// Triggers classified as witnesses at the last topology realization,
    /// in dense [`WitnessIndex`] order.
    pub fn find_active_event_witnesses(&self) -> &[EventTriggerId] {
        // TODO: merge run-time witnesses from the state's TriggerPool.
        &self.cache.witnesses
    }

    /// Witness indices whose derivative `deriv` depends on `stage`.
    pub fn witnesses_depending_on(&self, stage: Stage, deriv: usize) -> &[WitnessIndex] {
        &self.cache.witnesses_by_stage[stage.index()][deriv]
    }

    /// Trigger id for a dense witness index from the current cache.
    pub fn witness_trigger_id(&self, index: WitnessIndex) -> Option<EventTriggerId> {
        self.cache.witnesses.get(index.0).copied()
    }

    //--------------------------------------------------------------------
    // Schedule calculator
    //--------------------------------------------------------------------

    /// Next discrete trigger times, split into report-only and
    /// state-changing timers, with exact ties grouped.
    ///
    /// A timer drives changes iff any event it references owns a Change
    /// action; otherwise it is report-only (a timer with no events, or
    /// whose events have no actions, takes the report path). This lets an
    /// integrator schedule one authoritative "stop and report" time and
    /// one authoritative "stop and change state" time without missing a
    /// coincident trigger.
    pub fn find_next_scheduled_event_times(
        &self,
        state: &State,
        time_of_last_report: f64,
        time_of_last_change: f64,
    ) -> Result<NextEventTimes, EventError> {
        let mut next = NextEventTimes {
            time_of_next_report: f64::INFINITY,
            report_timers: Vec::new(),
            time_of_next_change: f64::INFINITY,
            change_timers: Vec::new(),
        };

        // Keep, replace, or join the running-best group for one path.
        fn consider(t: f64, id: EventTriggerId, best: &mut f64, group: &mut Vec<EventTriggerId>) {
            if t > *best {
                return; // not interesting
            }
            if t < *best {
                group.clear(); // forget previous earliest
                *best = t;
            }
            group.push(id); // new winner or exact tie
        }

        for &id in &self.cache.timers {
            let trigger = self.get_event_trigger(id)?;
            let Some(timer) = trigger.timer() else {
                continue; // cache holds timers only; stale entries skipped
            };

            let mut has_change_action = false;
            for &event_id in trigger.event_ids() {
                if self.get_event(event_id)?.has_change_action() {
                    has_change_action = true;
                    break;
                }
            }

            if has_change_action {
                let t = timer.time_of_next_trigger(state, time_of_last_change);
                consider(t, id, &mut next.time_of_next_change, &mut next.change_timers);
            } else {
                let t = timer.time_of_next_trigger(state, time_of_last_report);
                consider(t, id, &mut next.time_of_next_report, &mut next.report_timers);
            }
        }

        Ok(next)
    }

    //--------------------------------------------------------------------
    // Occurrence aggregator
    //--------------------------------------------------------------------

    /// Note that the given triggers have fired simultaneously (as
    /// determined by the caller, e.g. via root localization) and
    /// deduplicate them into the unique events they cause.
    ///
    /// Each firing trigger's occurrence counter is bumped once; each
    /// distinct caused event's counter is bumped once no matter how many
    /// triggers caused it. Unrecognized event ids go to the ignored list
    /// and never abort the batch.
    ///
    /// We expect very few simultaneous events (typically one trigger
    /// causing a single event), so the linear searches here are
    /// intentional: they beat a map for these sizes.
    pub fn note_event_occurrence(
        &mut self,
        firing_triggers: &[EventTriggerId],
    ) -> Result<OccurrenceReport, EventError> {
        let mut report = OccurrenceReport::default();

        for &trigger_id in firing_triggers {
            let trigger = self.get_event_trigger_mut(trigger_id)?;
            trigger.note_occurrence();
            // Tiny list; cloned so the events arena can be borrowed below.
            let event_ids = trigger.event_ids().to_vec();

            for event_id in event_ids {
                if !self.has_event(event_id) {
                    if !report.ignored_event_ids.contains(&event_id) {
                        report.ignored_event_ids.push(event_id);
                    }
                    continue;
                }

                match report
                    .triggered_events
                    .iter_mut()
                    .find(|(id, _)| *id == event_id)
                {
                    Some((_, causes)) => causes.push(trigger_id),
                    None => {
                        // First sighting of this event in the batch.
                        self.get_event_mut(event_id)?.note_occurrence();
                        report.triggered_events.push((event_id, vec![trigger_id]));
                    }
                }
            }
        }

        debug!(
            num_events = report.triggered_events.len(),
            num_ignored = report.ignored_event_ids.len(),
            "noted event occurrence"
        );
        Ok(report)
    }

    //--------------------------------------------------------------------
    // Action dispatcher
    //--------------------------------------------------------------------

    /// Run the Report actions of every event in the batch, in aggregation
    /// order, passing each its cause list. Read-only with respect to the
    /// state.
    ///
    /// An empty batch is a caller bug and is reported as
    /// [`EventError::EmptyBatch`].
    pub fn perform_event_report_actions(
        &self,
        state: &State,
        triggered_events: &EventsAndCauses,
    ) -> Result<(), EventError> {
        if triggered_events.is_empty() {
            return Err(EventError::EmptyBatch("perform_event_report_actions"));
        }

        for (event_id, causes) in triggered_events {
            self.get_event(*event_id)?
                .perform_report_actions(state, causes);
        }
        Ok(())
    }

    /// Run the Change actions of every event in the batch, in aggregation
    /// order, and report the accumulated exit status plus the lowest
    /// stage the batch invalidated.
    ///
    /// An empty batch is a caller bug and is reported as
    /// [`EventError::EmptyBatch`].
    pub fn perform_event_change_actions(
        &self,
        state: &mut State,
        triggered_events: &EventsAndCauses,
    ) -> Result<EventChangeResult, EventError> {
        if triggered_events.is_empty() {
            return Err(EventError::EmptyBatch("perform_event_change_actions"));
        }

        // Save the stage versions so we can look for changes.
        let versions_before = state.stage_versions();

        let mut result = EventChangeResult::default();
        for (event_id, causes) in triggered_events {
            self.get_event(*event_id)?
                .perform_change_actions(state, causes, &mut result);
        }

        let lowest_modified =
            Stage::lowest_difference(&versions_before, &state.stage_versions());
        result.set_lowest_modified_stage(lowest_modified);

        debug!(
            should_terminate = result.should_terminate(),
            lowest_modified_stage = ?lowest_modified,
            "performed event change actions"
        );
        Ok(result)
    }
}

impl Default for EventSubsystem {
    fn default() -> Self {
        Self::new()
    }
}
