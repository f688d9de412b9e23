//! Realization stages and stage version counters
//!
//! A `Stage` is an ordered level of derived-quantity realization in the
//! simulation. Cached computations at a stage are valid only while that
//! stage's version counter is unchanged; mutating a state variable
//! invalidates its stage and everything above it.

/// Ordered realization stages, lowest (most fundamental) first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(usize)]
pub enum Stage {
    /// Nothing realized yet
    Empty,
    /// System topology is frozen
    Topology,
    /// Modeling choices made
    Model,
    /// Instance parameters set
    Instance,
    /// Time-dependent quantities
    Time,
    /// Position-dependent quantities (kinematics)
    Position,
    /// Velocity-dependent quantities
    Velocity,
    /// Force and dynamics quantities
    Dynamics,
    /// Accelerations and constraint multipliers
    Acceleration,
    /// Report-only quantities
    Report,
}

impl Stage {
    /// Number of stages
    pub const COUNT: usize = 10;

    /// All stages in realization order
    pub const ALL: [Stage; Stage::COUNT] = [
        Stage::Empty,
        Stage::Topology,
        Stage::Model,
        Stage::Instance,
        Stage::Time,
        Stage::Position,
        Stage::Velocity,
        Stage::Dynamics,
        Stage::Acceleration,
        Stage::Report,
    ];

    /// Dense index of this stage, `0..Stage::COUNT`
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stage for a dense index, if in range
    pub fn from_index(index: usize) -> Option<Stage> {
        Stage::ALL.get(index).copied()
    }

    /// Lowest stage whose version differs between two snapshots, if any.
    ///
    /// Used after running change actions to report how much downstream
    /// computation must be invalidated and re-realized.
    pub fn lowest_difference(before: &StageVersions, after: &StageVersions) -> Option<Stage> {
        before
            .iter()
            .zip(after.iter())
            .position(|(b, a)| b != a)
            .and_then(Stage::from_index)
    }
}

/// Monotonically increasing per-stage version counter
pub type StageVersion = u64;

/// Snapshot of all stage versions, indexed by [`Stage::index`]
pub type StageVersions = [StageVersion; Stage::COUNT];
