//! The in-memory store of computed election winners.

use crate::events::{ElectionEvent, ElectionEventHandler};
use ballot_primitives::ElectionWinner;
use hashbrown::HashMap;
use spin::Mutex;
use tracing::{debug, warn};

/// Winners indexed by slot time and by parent-slot time.
///
/// Winner records are owned by the time index; the parent-slot index keys
/// back into it, so the two can never disagree on a winner's content. Both
/// indices and the latest-winner pointer live behind a single mutex:
/// lookups from the derivation data source are exclusive of inserts and
/// prunes performed by the driver's events.
#[derive(Debug, Default)]
pub struct ElectionStore {
    inner: Mutex<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    by_time: HashMap<u64, ElectionWinner>,
    by_parent_slot: HashMap<u64, u64>,
    latest: Option<ElectionWinner>,
}

impl ElectionStore {
    /// Creates an empty [ElectionStore].
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the winners of an epoch, sorted by time ascending.
    pub fn insert(&self, winners: &[ElectionWinner]) {
        if winners.is_empty() {
            warn!(target: "election_store", "No election winners to store");
            return;
        }

        let mut inner = self.inner.lock();
        for winner in winners {
            inner.by_time.insert(winner.time, *winner);
            inner.by_parent_slot.insert(winner.parent_slot, winner.time);
        }

        let newest = winners[winners.len() - 1];
        if inner.latest.map_or(true, |latest| newest.time > latest.time) {
            inner.latest = Some(newest);
        }
    }

    /// Looks up the winner of the slot at `timestamp`.
    pub fn by_time(&self, timestamp: u64) -> Option<ElectionWinner> {
        self.inner.lock().by_time.get(&timestamp).copied()
    }

    /// Looks up the winner whose expected L2 parent is at `timestamp`.
    pub fn by_parent_slot(&self, timestamp: u64) -> Option<ElectionWinner> {
        let inner = self.inner.lock();
        inner.by_parent_slot.get(&timestamp).and_then(|time| inner.by_time.get(time)).copied()
    }

    /// The most recent winner across all stored epochs.
    pub fn latest(&self) -> Option<ElectionWinner> {
        self.inner.lock().latest
    }

    /// Removes every winner with a slot time strictly before `timestamp`.
    pub fn prune_before(&self, timestamp: u64) {
        let mut inner = self.inner.lock();
        let before = inner.by_time.len();
        inner.by_time.retain(|time, _| *time >= timestamp);
        inner.by_parent_slot.retain(|_, time| *time >= timestamp);
        debug!(
            target: "election_store",
            time = timestamp,
            removed = before - inner.by_time.len(),
            "Removed outdated election winners"
        );
    }

    /// The number of stored winners.
    pub fn len(&self) -> usize {
        self.inner.lock().by_time.len()
    }

    /// Returns `true` if the store holds no winners.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ElectionEventHandler for ElectionStore {
    fn on_event(&self, event: &ElectionEvent) -> bool {
        match event {
            ElectionEvent::Winners(winners) => self.insert(winners),
            ElectionEvent::Outdated { time } => self.prune_before(*time),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloy_primitives::{address, Address};

    const A: Address = address!("00000000000000000000000000000000000000aa");
    const B: Address = address!("00000000000000000000000000000000000000bb");
    const C: Address = address!("00000000000000000000000000000000000000cc");

    fn seeded() -> ElectionStore {
        let store = ElectionStore::new();
        store.insert(&[
            ElectionWinner::new(A, 12, 0),
            ElectionWinner::new(B, 24, 12),
            ElectionWinner::new(C, 36, 24),
        ]);
        store
    }

    #[test]
    fn test_lookups() {
        let store = seeded();
        assert_eq!(store.by_time(24).unwrap().address, B);
        assert_eq!(store.by_parent_slot(24).unwrap().address, C);
        assert_eq!(store.latest().unwrap().address, C);
        assert!(store.by_time(48).is_none());
    }

    #[test]
    fn test_prune_before() {
        let store = seeded();
        store.prune_before(24);
        assert!(store.by_time(12).is_none());
        assert_eq!(store.by_time(24).unwrap().address, B);
        assert_eq!(store.by_time(36).unwrap().address, C);
        assert!(store.by_parent_slot(12).is_none());
        assert_eq!(store.by_parent_slot(24).unwrap().address, C);
        // Pruning never rewinds the latest pointer.
        assert_eq!(store.latest().unwrap().address, C);
    }

    #[test]
    fn test_latest_never_decreases() {
        let store = seeded();
        // A stale re-insert of an older epoch keeps the newer latest.
        store.insert(&[ElectionWinner::new(A, 12, 0)]);
        assert_eq!(store.latest().unwrap().time, 36);
    }

    #[test]
    fn test_empty_insert_is_noop() {
        let store = seeded();
        store.insert(&[]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_event_handling() {
        let store = ElectionStore::new();
        assert!(store.on_event(&ElectionEvent::Winners(vec![ElectionWinner::new(A, 12, 0)])));
        assert_eq!(store.len(), 1);
        assert!(store.on_event(&ElectionEvent::Outdated { time: 13 }));
        assert!(store.is_empty());
        assert!(!store.on_event(&ElectionEvent::Error(
            crate::ElectionError::PolicyInvalid.crit()
        )));
    }
}
