//! The read-side handle over the election store.

use crate::store::ElectionStore;
use alloc::sync::Arc;
use ballot_primitives::ElectionWinner;

/// A read-only view over computed election winners.
///
/// The derivation data source consumes this trait rather than the store
/// itself, keeping the wiring unidirectional: the driver publishes winners
/// and the data source only ever reads them. Absence is not an error; a
/// missing winner means the slot is missed and no batch is admissible.
pub trait ElectionWinnerProvider {
    /// The winner of the slot at `timestamp`, if one is known.
    fn winner_by_time(&self, timestamp: u64) -> Option<ElectionWinner>;

    /// The winner whose expected L2 parent block is at `timestamp`.
    fn winner_by_parent_slot(&self, timestamp: u64) -> Option<ElectionWinner>;

    /// The most recent known winner.
    fn latest_winner(&self) -> Option<ElectionWinner>;
}

/// A cheaply clonable [ElectionWinnerProvider] backed by an [ElectionStore].
#[derive(Debug, Clone)]
pub struct ElectionClient {
    store: Arc<ElectionStore>,
}

impl ElectionClient {
    /// Creates a new [ElectionClient] over the given store.
    pub const fn new(store: Arc<ElectionStore>) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub const fn store(&self) -> &Arc<ElectionStore> {
        &self.store
    }
}

impl ElectionWinnerProvider for ElectionClient {
    fn winner_by_time(&self, timestamp: u64) -> Option<ElectionWinner> {
        self.store.by_time(timestamp)
    }

    fn winner_by_parent_slot(&self, timestamp: u64) -> Option<ElectionWinner> {
        self.store.by_parent_slot(timestamp)
    }

    fn latest_winner(&self) -> Option<ElectionWinner> {
        self.store.latest()
    }
}
