//! Minimal simulation state surface
//!
//! The full multibody state (mass matrices, constraint forces, caches) is
//! out of scope for the event core; this type carries exactly what event
//! scheduling needs: the current time, the continuous variables witnesses
//! and change actions touch, the accuracy in use, and the per-stage version
//! counters that let the dispatcher report what a batch invalidated.

use nalgebra::DVector;

use crate::stage::{Stage, StageVersion, StageVersions};
use crate::utils::constants::DEFAULT_ACCURACY;

/// Continuous-time simulation state with stage version tracking.
///
/// Mutating accessors invalidate the stage the variable belongs to and
/// every stage above it, bumping their version counters. The Action
/// Dispatcher snapshots the counters around a batch of change actions to
/// find the lowest stage the batch modified.
#[derive(Debug, Clone)]
pub struct State {
    time: f64,
    q: DVector<f64>,
    u: DVector<f64>,
    accuracy: f64,
    stage_versions: StageVersions,
}

impl State {
    /// Create a state with `nq` generalized coordinates and `nu`
    /// generalized speeds, all zero, at time zero.
    pub fn new(nq: usize, nu: usize) -> Self {
        Self {
            time: 0.0,
            q: DVector::zeros(nq),
            u: DVector::zeros(nu),
            accuracy: DEFAULT_ACCURACY,
            stage_versions: [1; Stage::COUNT],
        }
    }

    /// Current simulation time
    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Set the time; invalidates [`Stage::Time`] and above.
    pub fn set_time(&mut self, time: f64) {
        self.time = time;
        self.invalidate(Stage::Time);
    }

    /// Generalized coordinates
    #[inline]
    pub fn q(&self) -> &DVector<f64> {
        &self.q
    }

    /// Writable generalized coordinates; invalidates [`Stage::Position`]
    /// and above.
    pub fn q_mut(&mut self) -> &mut DVector<f64> {
        self.invalidate(Stage::Position);
        &mut self.q
    }

    /// Generalized speeds
    #[inline]
    pub fn u(&self) -> &DVector<f64> {
        &self.u
    }

    /// Writable generalized speeds; invalidates [`Stage::Velocity`] and
    /// above.
    pub fn u_mut(&mut self) -> &mut DVector<f64> {
        self.invalidate(Stage::Velocity);
        &mut self.u
    }

    /// Accuracy requirement in use by the current study; change actions
    /// receive this when they run.
    #[inline]
    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    /// Set the accuracy in use. Does not invalidate any stage.
    pub fn set_accuracy(&mut self, accuracy: f64) {
        self.accuracy = accuracy;
    }

    /// Bump the version counters for `stage` and every stage above it.
    pub fn invalidate(&mut self, stage: Stage) {
        for version in &mut self.stage_versions[stage.index()..] {
            *version += 1;
        }
    }

    /// Snapshot of every stage's version counter
    #[inline]
    pub fn stage_versions(&self) -> StageVersions {
        self.stage_versions
    }

    /// Version counter for one stage
    #[inline]
    pub fn stage_version(&self, stage: Stage) -> StageVersion {
        self.stage_versions[stage.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutation_invalidates_stage_and_above() {
        let mut state = State::new(2, 2);
        let before = state.stage_versions();

        state.q_mut()[0] = 1.5;
        let after = state.stage_versions();

        assert_eq!(
            Stage::lowest_difference(&before, &after),
            Some(Stage::Position)
        );
        // Stages below Position are untouched.
        assert_eq!(before[Stage::Time.index()], after[Stage::Time.index()]);
        // Stages above Position were bumped too.
        assert!(after[Stage::Report.index()] > before[Stage::Report.index()]);
    }

    #[test]
    fn set_time_invalidates_time_stage() {
        let mut state = State::new(0, 0);
        let before = state.stage_versions();
        state.set_time(0.25);
        assert_eq!(
            Stage::lowest_difference(&before, &state.stage_versions()),
            Some(Stage::Time)
        );
    }
}
