//! Registry and storage discipline tests

use simevents::{
    Event, EventError, EventId, EventSubsystem, EventTrigger, EventTriggerId, IdKind, State,
    TriggerPool,
};

// ==================================================================================
// APPEND-ONLY REGISTRY
// ==================================================================================

#[test]
fn test_adopt_event_ids_unique_and_increasing() {
    let mut sub = EventSubsystem::new();
    let first = sub.num_events();

    let a = sub.adopt_event(Event::new("a"));
    let b = sub.adopt_event(Event::new("b"));
    let c = sub.adopt_event(Event::new("c"));

    assert_eq!(a.index(), first);
    assert_eq!(b.index(), first + 1);
    assert_eq!(c.index(), first + 2);

    // Lookup returns the identical object.
    assert_eq!(sub.get_event(b).unwrap().description(), "b");
    assert_eq!(sub.num_events(), first + 3);
}

#[test]
fn test_adopt_trigger_ids_unique_and_increasing() {
    let mut sub = EventSubsystem::new();
    let first = sub.num_event_triggers();

    let a = sub.adopt_event_trigger(EventTrigger::new_plain("ta"));
    let b = sub.adopt_event_trigger(EventTrigger::new_plain("tb"));

    assert_eq!(a.index(), first);
    assert_eq!(b.index(), first + 1);
    assert_eq!(sub.get_event_trigger(a).unwrap().description(), "ta");
}

#[test]
fn test_id_error_causes_are_distinct() {
    let sub = EventSubsystem::new();

    // Uninitialized id
    match sub.get_event(EventId::INVALID) {
        Err(EventError::UninitializedId(IdKind::Event)) => {}
        other => panic!("expected UninitializedId, got {other:?}"),
    }

    // Out-of-range id carries the index and the registered count.
    let count = sub.num_events();
    match sub.get_event(EventId::new(count + 10)) {
        Err(EventError::IdOutOfRange {
            kind: IdKind::Event,
            index,
            count: reported,
        }) => {
            assert_eq!(index, count + 10);
            assert_eq!(reported, count);
        }
        other => panic!("expected IdOutOfRange, got {other:?}"),
    }

    // Trigger errors name the trigger id kind.
    match sub.get_event_trigger(EventTriggerId::INVALID) {
        Err(EventError::UninitializedId(IdKind::EventTrigger)) => {}
        other => panic!("expected UninitializedId, got {other:?}"),
    }
}

#[test]
fn test_has_never_fails() {
    let mut sub = EventSubsystem::new();
    let id = sub.adopt_event(Event::new("e"));

    assert!(sub.has_event(id));
    assert!(!sub.has_event(EventId::INVALID));
    assert!(!sub.has_event(EventId::new(9999)));

    assert!(sub.has_event_trigger(sub.termination_trigger_id()));
    assert!(!sub.has_event_trigger(EventTriggerId::INVALID));
    assert!(!sub.has_event_trigger(EventTriggerId::new(9999)));
}

#[test]
fn test_default_ids_are_uninitialized() {
    assert!(!EventId::default().is_valid());
    assert!(!EventTriggerId::default().is_valid());
    assert!(EventId::new(0).is_valid());
}

// ==================================================================================
// RUN-TIME TRIGGER POOL
// ==================================================================================

#[test]
fn test_trigger_pool_round_trip() {
    let mut pool = TriggerPool::new();

    let timer = EventTrigger::new_timer("runtime timer", |_: &State, t: f64| t + 1.0);
    let index = pool.adopt_timer(timer);
    assert_eq!(index, 0);
    assert_eq!(pool.timers().count(), 1);

    let removed = pool.remove_timer(index).expect("timer slot should be live");
    assert_eq!(removed.description(), "runtime timer");
    assert_eq!(pool.timers().count(), 0);

    // Witness pool is independent of the timer pool.
    assert_eq!(pool.witnesses().count(), 0);
}
