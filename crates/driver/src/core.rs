//! The election driver state machine.

use crate::events::ChainHeadEvent;
use alloc::vec::Vec;
use ballot_election::{
    BeaconLookaheadProvider, Election, ElectionEmitter, ElectionError, ElectionEvent,
    EthCallProvider, PubkeyToOperator,
};
use ballot_primitives::ElectionWinner;
use op_alloy_protocol::{BlockInfo, L2BlockInfo};
use tracing::{debug, trace, warn};

/// The election driver.
///
/// Reacts to chain-head events, decides when the winners of the next
/// epoch must be computed, and publishes results through its emitter.
/// All event handling is serialized by the embedding event loop; the
/// driver's state is only reachable through `&mut self`.
#[derive(Debug)]
pub struct ElectionDriver<B, L1, L2, E, M = ballot_election::TruncatedPubkey> {
    /// The election computation.
    election: Election<B, L1, L2, M>,
    /// The sink for election events.
    emitter: E,
    /// The most recent L1 unsafe head.
    l1_unsafe: Option<BlockInfo>,
    /// The most recent L2 pending-safe head.
    l2_unsafe: Option<L2BlockInfo>,
    /// The most recent finalized L2 head.
    l2_finalized: Option<L2BlockInfo>,
    /// The slot time of the last slot of the most recently computed epoch.
    last_slot_time: u64,
    /// The computed winners, at most one entry per epoch, epochs ascending.
    winners_by_epoch: Vec<(u64, Vec<ElectionWinner>)>,
}

impl<B, L1, L2, E, M> ElectionDriver<B, L1, L2, E, M>
where
    B: BeaconLookaheadProvider,
    L1: EthCallProvider,
    L2: EthCallProvider,
    E: ElectionEmitter,
    M: PubkeyToOperator,
{
    /// Creates a new [ElectionDriver].
    pub const fn new(election: Election<B, L1, L2, M>, emitter: E) -> Self {
        Self {
            election,
            emitter,
            l1_unsafe: None,
            l2_unsafe: None,
            l2_finalized: None,
            last_slot_time: 0,
            winners_by_epoch: Vec::new(),
        }
    }

    /// The election computation.
    pub const fn election(&self) -> &Election<B, L1, L2, M> {
        &self.election
    }

    /// The slot time of the last slot of the most recently computed epoch.
    pub const fn last_slot_time(&self) -> u64 {
        self.last_slot_time
    }

    /// The most recent L1 unsafe head seen by the driver.
    pub const fn l1_unsafe(&self) -> Option<BlockInfo> {
        self.l1_unsafe
    }

    /// The most recent finalized L2 head seen by the driver.
    pub const fn l2_finalized(&self) -> Option<L2BlockInfo> {
        self.l2_finalized
    }

    /// The winners computed for `epoch`, if still retained.
    pub fn winners_for_epoch(&self, epoch: u64) -> Option<&[ElectionWinner]> {
        self.winners_by_epoch
            .iter()
            .find(|(e, _)| *e == epoch)
            .map(|(_, winners)| winners.as_slice())
    }

    /// The most recently computed epoch.
    pub fn latest_epoch(&self) -> Option<u64> {
        self.winners_by_epoch.last().map(|(epoch, _)| *epoch)
    }

    /// Dispatches a chain-head event to the driver.
    pub async fn on_event(&mut self, event: ChainHeadEvent) {
        trace!(target: "election_driver", event = event.name(), "Dispatching event");
        match event {
            ChainHeadEvent::L1Unsafe(l1_ref) => {
                self.l1_unsafe = Some(l1_ref);
                self.reassess().await;
            }
            ChainHeadEvent::PendingSafeUpdate(l2_ref) => {
                self.l2_unsafe = Some(l2_ref);
                self.reassess().await;
            }
            ChainHeadEvent::ForkchoiceUpdated(finalized) => self.on_forkchoice_updated(finalized),
        }
    }

    /// Prunes stored winners when L2 finalization advances.
    fn on_forkchoice_updated(&mut self, finalized: L2BlockInfo) {
        let advanced = self
            .l2_finalized
            .map_or(true, |prev| finalized.block_info.timestamp > prev.block_info.timestamp);
        if !advanced {
            return;
        }
        debug!(
            target: "election_driver",
            time = finalized.block_info.timestamp,
            "L2 finalization advanced, retiring outdated winners"
        );
        self.emitter.emit(ElectionEvent::Outdated { time: finalized.block_info.timestamp });
        self.l2_finalized = Some(finalized);
    }

    /// Decides whether the next epoch's winners can and should be computed.
    async fn reassess(&mut self) {
        // Wait until both heads are known.
        let (Some(l1), Some(l2)) = (self.l1_unsafe, self.l2_unsafe) else {
            return;
        };

        // Still inside the most recently computed epoch.
        if l1.timestamp < self.last_slot_time {
            return;
        }
        // The L2 chain trails the computed epoch; wait for it to catch up.
        if self.last_slot_time != 0 && l2.block_info.timestamp < self.last_slot_time {
            return;
        }

        let interval = self.election.timing().slot_interval;

        // Normally the head is at (or one interval past) the last computed
        // slot and the next epoch starts one interval after the head. If
        // the head lands anywhere else, L1 slots were skipped across the
        // epoch boundary: the head itself already sits in the new epoch,
        // and the previous block is the last one inside the old epoch.
        let slots_missed = self.last_slot_time != 0
            && l1.timestamp != self.last_slot_time
            && l1.timestamp != self.last_slot_time + interval;
        let (policy_block, next_epoch_time) = if slots_missed {
            (l1.number.saturating_sub(1), l1.timestamp)
        } else {
            (l1.number, l1.timestamp + interval)
        };

        let epoch = match self.election.epoch_of(next_epoch_time) {
            Ok(epoch) => epoch,
            Err(err) => {
                warn!(target: "election_driver", %err, "Cannot derive next epoch from L1 head");
                self.emitter.emit(ElectionEvent::Error(ElectionError::Timing(err).crit()));
                return;
            }
        };

        debug!(
            target: "election_driver",
            epoch,
            policy_block,
            slots_missed,
            "Computing election winners"
        );
        match self
            .election
            .compute_winners(epoch, l2.block_info.number, l2.block_info.timestamp, policy_block)
            .await
        {
            Ok(winners) => {
                self.emitter.emit(ElectionEvent::Winners(winners.clone()));
                self.record_epoch(epoch, winners);
            }
            Err(err) => {
                // Keep the previous state; a later event retries.
                warn!(target: "election_driver", %err, "Election computation failed");
                self.emitter.emit(ElectionEvent::Error(err));
            }
        }
    }

    /// Records an epoch's winners and advances the epoch cursor.
    fn record_epoch(&mut self, epoch: u64, winners: Vec<ElectionWinner>) {
        if let Some(last) = winners.last() {
            self.last_slot_time = last.time;
        }
        self.winners_by_epoch.retain(|(e, _)| *e >= epoch);
        if let Some(entry) = self.winners_by_epoch.iter_mut().find(|(e, _)| *e == epoch) {
            entry.1 = winners;
        } else {
            self.winners_by_epoch.push((epoch, winners));
        }
    }
}
