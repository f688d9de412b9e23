//! Opaque identifiers for events and triggers

/// Identifier of a registered [`Event`](crate::events::Event).
///
/// Assigned densely, zero-based, by the subsystem that adopts the event;
/// never reused for the subsystem's lifetime. The default value is the
/// invalid ("uninitialized") id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(usize);

impl EventId {
    /// The uninitialized id
    pub const INVALID: EventId = EventId(usize::MAX);

    /// Make an id from a raw dense index.
    pub const fn new(index: usize) -> Self {
        EventId(index)
    }

    /// True unless this is the uninitialized id
    #[inline]
    pub fn is_valid(self) -> bool {
        self.0 != usize::MAX
    }

    /// Raw dense index
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        EventId::INVALID
    }
}

/// Identifier of a registered [`EventTrigger`](crate::events::EventTrigger).
///
/// Same discipline as [`EventId`]: dense, zero-based, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventTriggerId(usize);

impl EventTriggerId {
    /// The uninitialized id
    pub const INVALID: EventTriggerId = EventTriggerId(usize::MAX);

    /// Make an id from a raw dense index.
    pub const fn new(index: usize) -> Self {
        EventTriggerId(index)
    }

    /// True unless this is the uninitialized id
    #[inline]
    pub fn is_valid(self) -> bool {
        self.0 != usize::MAX
    }

    /// Raw dense index
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl Default for EventTriggerId {
    fn default() -> Self {
        EventTriggerId::INVALID
    }
}

/// Dense index of a timer in the topology cache's timer list.
///
/// Valid only between two topology realizations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerIndex(pub usize);

/// Dense index of a witness in the topology cache's witness list.
///
/// Valid only between two topology realizations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WitnessIndex(pub usize);
