//! The election winner record produced per L1 slot.

use alloy_primitives::Address;

/// The unique operator permitted to submit the batch for one slot.
///
/// A zero [`address`](Self::address) marks a missed slot: no operator won the
/// election and no batch is admissible at [`time`](Self::time). A zero
/// [`parent_slot`](Self::parent_slot) means the parent L2 block could not be
/// inferred when the winner was computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElectionWinner {
    /// The elected operator, or zero if the slot is missed.
    pub address: Address,
    /// The timestamp of the slot this winner was elected for.
    pub time: u64,
    /// The timestamp of the L2 parent block expected to precede the slot,
    /// or zero when unknown.
    pub parent_slot: u64,
}

impl ElectionWinner {
    /// Creates a new [ElectionWinner].
    pub const fn new(address: Address, time: u64, parent_slot: u64) -> Self {
        Self { address, time, parent_slot }
    }

    /// Returns `true` if no operator won the election for this slot.
    pub fn is_missed(&self) -> bool {
        self.address.is_zero()
    }
}
