//! End-to-end bouncing ball: a witness-triggered impact handler plus a
//! scheduled reporter, driven by a small semi-implicit Euler loop that
//! plays the integrator's role.

use std::sync::{Arc, Mutex};

use approx::assert_relative_eq;
use simevents::{
    ActionOutcome, EventSubsystem, ScheduledEventReporter, Stage, State, TriggeredEventHandler,
    WitnessTriggerInfo,
};

const GRAVITY: f64 = 9.81;
const INITIAL_HEIGHT: f64 = 1.0;
const RESTITUTION: f64 = 0.5;
const STEP: f64 = 1e-3;
const END_TIME: f64 = 1.2;

/// Impact handler: fires when the height crosses zero going down and
/// reflects the velocity.
struct BounceHandler {
    bounce_times: Mutex<Vec<f64>>,
}

impl TriggeredEventHandler for BounceHandler {
    fn value(&self, state: &State) -> f64 {
        state.q()[0]
    }

    fn required_stage(&self) -> Stage {
        Stage::Position
    }

    fn trigger_info(&self) -> WitnessTriggerInfo {
        WitnessTriggerInfo {
            trigger_on_rising: false,
            trigger_on_falling: true,
            localization_window: 0.05,
        }
    }

    fn handle_event(&self, state: &mut State, _accuracy: f64) -> ActionOutcome {
        let v = state.u()[0];
        state.u_mut()[0] = -RESTITUTION * v;
        state.q_mut()[0] = 0.0;
        self.bounce_times.lock().unwrap().push(state.time());
        ActionOutcome::Succeeded
    }

    fn event_description(&self) -> &str {
        "ground impact"
    }
}

/// Records the ball height at fixed reporting intervals.
struct HeightLogger {
    period: f64,
    samples: Mutex<Vec<(f64, f64)>>,
}

impl ScheduledEventReporter for HeightLogger {
    fn next_event_time(&self, state: &State, include_current_time: bool) -> f64 {
        let t = state.time();
        let k = (t / self.period).floor();
        let candidate = k * self.period;
        if include_current_time && (t - candidate).abs() < 1e-9 {
            candidate
        } else {
            (k + 1.0) * self.period
        }
    }

    fn handle_event(&self, state: &State) {
        self.samples
            .lock()
            .unwrap()
            .push((state.time(), state.q()[0]));
    }
}

#[test]
fn test_bouncing_ball_with_periodic_reports() {
    let mut sub = EventSubsystem::new();

    let handler = Arc::new(BounceHandler {
        bounce_times: Mutex::new(Vec::new()),
    });
    let bounce = sub.adopt_triggered_event_handler(handler.clone());

    let logger = Arc::new(HeightLogger {
        period: 0.5,
        samples: Mutex::new(Vec::new()),
    });
    let report = sub.adopt_scheduled_event_reporter(logger.clone());

    sub.realize_topology();
    assert_eq!(sub.find_active_event_witnesses(), &[bounce.trigger_id]);
    assert_eq!(sub.find_active_event_timers(), &[report.trigger_id]);

    let mut state = State::new(1, 1);
    state.q_mut()[0] = INITIAL_HEIGHT;

    let witness = sub
        .get_event_trigger(bounce.trigger_id)
        .unwrap()
        .witness()
        .unwrap()
        .clone();
    let mut prev_height = witness.value(&state, 0);
    let mut time_of_last_report = 0.0;

    while state.time() < END_TIME {
        // The reporter is the only timer and it drives no changes.
        let next = sub
            .find_next_scheduled_event_times(&state, time_of_last_report, 0.0)
            .unwrap();
        assert!(next.time_of_next_change.is_infinite());

        // Semi-implicit Euler step.
        let t_new = state.time() + STEP;
        state.u_mut()[0] -= GRAVITY * STEP;
        let u = state.u()[0];
        state.q_mut()[0] += u * STEP;
        state.set_time(t_new);

        // Witness check: the step itself is the (crude) localizer here.
        let height = witness.value(&state, 0);
        if witness.matches_transition(prev_height, height) {
            let occurred = sub.note_event_occurrence(&[bounce.trigger_id]).unwrap();
            let result = sub
                .perform_event_change_actions(&mut state, &occurred.triggered_events)
                .unwrap();
            assert!(!result.should_terminate());
            assert_eq!(result.lowest_modified_stage(), Some(Stage::Position));
            prev_height = witness.value(&state, 0);
        } else {
            prev_height = height;
        }

        // Report stop reached during this step.
        if next.time_of_next_report.is_finite() && state.time() + 1e-9 >= next.time_of_next_report
        {
            let occurred = sub.note_event_occurrence(&next.report_timers).unwrap();
            sub.perform_event_report_actions(&state, &occurred.triggered_events)
                .unwrap();
            time_of_last_report = next.time_of_next_report;
        }
    }

    // Free fall from 1 m hits the ground at sqrt(2 h / g) = 0.4515 s; with
    // e = 0.5 each flight afterwards takes half as long.
    let first = (2.0 * INITIAL_HEIGHT / GRAVITY).sqrt();
    let bounces = handler.bounce_times.lock().unwrap();
    assert_eq!(bounces.len(), 3);
    assert_relative_eq!(bounces[0], first, epsilon = 0.01);
    assert_relative_eq!(bounces[1], 2.0 * first, epsilon = 0.02);
    assert_relative_eq!(bounces[2], 2.5 * first, epsilon = 0.03);

    // One report every half second: 0.5 and 1.0 fall inside the run.
    let samples = logger.samples.lock().unwrap();
    assert_eq!(samples.len(), 2);
    assert_relative_eq!(samples[0].0, 0.5, epsilon = 0.01);
    assert_relative_eq!(samples[1].0, 1.0, epsilon = 0.01);
    // At t = 0.5 the ball has already bounced once and is on its way up.
    assert!(samples[0].1 >= 0.0);

    // Occurrence bookkeeping matches what actually happened.
    assert_eq!(
        sub.get_event(bounce.event_id).unwrap().occurrence_count(),
        bounces.len() as u64
    );
    assert_eq!(
        sub.get_event_trigger(report.trigger_id)
            .unwrap()
            .occurrence_count(),
        samples.len() as u64
    );
}
