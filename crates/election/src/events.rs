//! In-process events tying the election engine together.
//!
//! The driver emits events through the [ElectionEmitter] it is constructed
//! with; consumers such as the [ElectionStore] implement
//! [ElectionEventHandler]. The wiring is unidirectional: emitters never
//! learn who handles their events.
//!
//! [ElectionStore]: crate::ElectionStore

use crate::errors::ElectionErrorKind;
use alloc::vec::Vec;
use ballot_primitives::ElectionWinner;

/// An event produced by the election driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElectionEvent {
    /// Winners were computed for a new epoch, sorted by time ascending.
    Winners(Vec<ElectionWinner>),
    /// Winners before `time` can no longer affect derivation and should
    /// be pruned.
    Outdated {
        /// The timestamp of the last finalized L2 block.
        time: u64,
    },
    /// The election computation failed; prior winners remain valid.
    Error(ElectionErrorKind),
}

impl ElectionEvent {
    /// The stable name of the event, for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Winners(_) => "election-winner",
            Self::Outdated { .. } => "election-winner-outdated",
            Self::Error(_) => "election-error",
        }
    }
}

impl core::fmt::Display for ElectionEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// The sink for [ElectionEvent]s.
pub trait ElectionEmitter {
    /// Emits a single event.
    fn emit(&mut self, event: ElectionEvent);
}

/// Any `FnMut(ElectionEvent)` is an emitter, which makes wiring the driver
/// to an event loop or a channel a one-liner.
impl<F> ElectionEmitter for F
where
    F: FnMut(ElectionEvent),
{
    fn emit(&mut self, event: ElectionEvent) {
        self(event)
    }
}

/// A consumer of [ElectionEvent]s.
pub trait ElectionEventHandler {
    /// Handles an event, returning `true` if it was consumed.
    fn on_event(&self, event: &ElectionEvent) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::{vec, vec::Vec};

    #[test]
    fn test_event_names() {
        assert_eq!(ElectionEvent::Winners(vec![]).name(), "election-winner");
        assert_eq!(ElectionEvent::Outdated { time: 0 }.name(), "election-winner-outdated");
    }

    #[test]
    fn test_closure_emitter() {
        let mut seen = Vec::new();
        let mut emitter = |event: ElectionEvent| seen.push(event);
        emitter.emit(ElectionEvent::Outdated { time: 7 });
        assert_eq!(seen, [ElectionEvent::Outdated { time: 7 }]);
    }
}
