//! Slot and epoch arithmetic for the L1 consensus clock.

use thiserror::Error;

/// The fixed timing parameters of the upstream consensus chain.
///
/// [SlotTiming] is the single authority for converting between wall-clock
/// timestamps, slots, and epochs. All other components defer to it so that
/// online clients, fakes, and tests agree bit-exactly on the arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotTiming {
    /// Timestamp of slot zero.
    pub genesis_time: u64,
    /// Seconds between consecutive slots.
    pub slot_interval: u64,
    /// Number of slots per epoch.
    pub slots_per_epoch: u64,
}

/// An error produced by [SlotTiming] conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SlotTimingError {
    /// The timestamp does not fall on a slot boundary.
    #[error("Timestamp {0} is not aligned to a slot boundary")]
    Misaligned(u64),
    /// The timestamp predates the chain genesis.
    #[error("Timestamp {0} predates the chain genesis")]
    BeforeGenesis(u64),
}

impl SlotTiming {
    /// Creates a new [SlotTiming].
    pub const fn new(genesis_time: u64, slot_interval: u64, slots_per_epoch: u64) -> Self {
        Self { genesis_time, slot_interval, slots_per_epoch }
    }

    /// Returns the timestamp of the given slot.
    pub const fn time_of_slot(&self, slot: u64) -> u64 {
        self.genesis_time + slot * self.slot_interval
    }

    /// Returns the slot whose boundary is at `timestamp`.
    pub const fn slot_of(&self, timestamp: u64) -> Result<u64, SlotTimingError> {
        if timestamp < self.genesis_time {
            return Err(SlotTimingError::BeforeGenesis(timestamp));
        }
        let elapsed = timestamp - self.genesis_time;
        if elapsed % self.slot_interval != 0 {
            return Err(SlotTimingError::Misaligned(timestamp));
        }
        Ok(elapsed / self.slot_interval)
    }

    /// Returns the epoch containing the slot whose boundary is at `timestamp`.
    pub const fn epoch_of(&self, timestamp: u64) -> Result<u64, SlotTimingError> {
        match self.slot_of(timestamp) {
            Ok(slot) => Ok(slot / self.slots_per_epoch),
            Err(e) => Err(e),
        }
    }

    /// Returns the first slot of the given epoch.
    pub const fn first_slot_of_epoch(&self, epoch: u64) -> u64 {
        epoch * self.slots_per_epoch
    }
}
