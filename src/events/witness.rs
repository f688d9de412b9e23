//! Continuous witness functions
//!
//! A witness is a continuous scalar function of the state whose sign
//! change signals an event (contact transitions, joint-limit stops). The
//! core classifies and schedules witnesses; localizing the exact crossing
//! time is the integrator's job, guided by the witness's accuracy-relative
//! localization window.

use crate::stage::Stage;
use crate::state::State;
use crate::utils::constants::DEFAULT_LOCALIZATION_WINDOW;

/// Which zero crossings of the witness function count as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Negative-to-positive crossings only
    Rising,
    /// Positive-to-negative crossings only
    Falling,
    /// Crossings in either direction
    RisingAndFalling,
}

impl Direction {
    /// Classify a sign transition between two sampled witness values.
    ///
    /// A transition counts if the sign changed (or the value just reached
    /// exactly zero) and the change matches this direction. Detection
    /// only; localizing the crossing time is up to the caller.
    pub fn matches_transition(self, prev: f64, curr: f64) -> bool {
        let crossed = (prev * curr).signum() < 0.0 || (curr == 0.0 && prev != 0.0);
        if !crossed {
            return false;
        }
        match self {
            Direction::Rising => curr > prev,
            Direction::Falling => curr < prev,
            Direction::RisingAndFalling => true,
        }
    }
}

/// Sign classification of the witness function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// The function is meaningful on both sides of zero.
    Bilateral,
}

/// Temporal character of the witness function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Temporality {
    /// The function varies continuously with time.
    Continuous,
}

/// Value and stage-dependency provider of a witness.
///
/// `deriv_order` 0 is the witness value itself; higher orders are its time
/// derivatives, up to `num_time_derivatives()`.
pub trait WitnessFn: Send + Sync {
    /// Evaluate the witness (or one of its time derivatives).
    fn value(&self, state: &State, deriv_order: usize) -> f64;

    /// Realization stage the given derivative order depends on.
    fn depends_on_stage(&self, deriv_order: usize) -> Stage;

    /// Number of time derivatives this witness can evaluate.
    fn num_time_derivatives(&self) -> usize {
        0
    }

    /// Duplicate this witness function behind a fresh box.
    fn clone_box(&self) -> Box<dyn WitnessFn>;
}

impl Clone for Box<dyn WitnessFn> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// A continuous zero-crossing detector.
///
/// Carries the scalar function plus the metadata the scheduler and the
/// external localizer need: polarity, transition direction, temporality,
/// and the accuracy-relative time window within which the crossing must be
/// localized.
#[derive(Clone)]
pub struct Witness {
    polarity: Polarity,
    direction: Direction,
    temporality: Temporality,
    localization_window: f64,
    func: Box<dyn WitnessFn>,
}

impl Witness {
    /// Create a bilateral, continuous witness with the default
    /// localization window.
    pub fn new(direction: Direction, func: impl WitnessFn + 'static) -> Self {
        Self {
            polarity: Polarity::Bilateral,
            direction,
            temporality: Temporality::Continuous,
            localization_window: DEFAULT_LOCALIZATION_WINDOW,
            func: Box::new(func),
        }
    }

    /// Set the accuracy-relative localization time window.
    pub fn with_localization_window(mut self, window: f64) -> Self {
        self.localization_window = window;
        self
    }

    /// Sign classification
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Which crossings count as events
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Temporal character
    pub fn temporality(&self) -> Temporality {
        self.temporality
    }

    /// Accuracy-relative time window for resolving the crossing time
    pub fn localization_window(&self) -> f64 {
        self.localization_window
    }

    /// Evaluate the witness value or one of its time derivatives.
    pub fn value(&self, state: &State, deriv_order: usize) -> f64 {
        self.func.value(state, deriv_order)
    }

    /// Stage the given derivative order depends on
    pub fn depends_on_stage(&self, deriv_order: usize) -> Stage {
        self.func.depends_on_stage(deriv_order)
    }

    /// Declared number of evaluable time derivatives
    pub fn num_time_derivatives(&self) -> usize {
        self.func.num_time_derivatives()
    }

    /// True if the sign transition from `prev` to `curr` fires this
    /// witness.
    pub fn matches_transition(&self, prev: f64, curr: f64) -> bool {
        self.direction.matches_transition(prev, curr)
    }
}

impl std::fmt::Debug for Witness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Witness")
            .field("polarity", &self.polarity)
            .field("direction", &self.direction)
            .field("temporality", &self.temporality)
            .field("localization_window", &self.localization_window)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_classifies_sign_transitions() {
        // Upward crossing
        assert!(Direction::Rising.matches_transition(-1.0, 1.0));
        assert!(!Direction::Falling.matches_transition(-1.0, 1.0));
        assert!(Direction::RisingAndFalling.matches_transition(-1.0, 1.0));

        // Downward crossing
        assert!(Direction::Falling.matches_transition(0.5, -0.5));
        assert!(!Direction::Rising.matches_transition(0.5, -0.5));

        // Exactly hitting zero counts
        assert!(Direction::Falling.matches_transition(0.5, 0.0));

        // No crossing
        assert!(!Direction::RisingAndFalling.matches_transition(1.0, 2.0));
        assert!(!Direction::RisingAndFalling.matches_transition(0.0, 0.0));
    }
}
