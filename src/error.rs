//! Error types for the event scheduling core

use std::fmt;

use thiserror::Error;

/// Which family of identifier an id error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    /// An [`EventId`](crate::events::EventId)
    Event,
    /// An [`EventTriggerId`](crate::events::EventTriggerId)
    EventTrigger,
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Event => write!(f, "event"),
            Self::EventTrigger => write!(f, "event trigger"),
        }
    }
}

/// Event-core errors
///
/// All identifier failures are precondition violations: they indicate a
/// programming error in model construction, not a runtime condition to
/// retry. The three id causes are reported distinctly so the caller can
/// tell a never-initialized id from a stale or fabricated one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("uninitialized (invalid) {0} id")]
    UninitializedId(IdKind),

    #[error("{kind} id {index} out of range ({count} registered)")]
    IdOutOfRange {
        kind: IdKind,
        index: usize,
        count: usize,
    },

    #[error("no {kind} stored at slot {index}")]
    EmptySlot { kind: IdKind, index: usize },

    #[error("empty event batch passed to {0}")]
    EmptyBatch(&'static str),
}
