//! The chain-head events the driver reacts to.

use op_alloy_protocol::{BlockInfo, L2BlockInfo};

/// A chain-head update dispatched to the [ElectionDriver].
///
/// [ElectionDriver]: crate::ElectionDriver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainHeadEvent {
    /// A new L1 unsafe head was observed.
    L1Unsafe(BlockInfo),
    /// The L2 pending-safe head advanced.
    PendingSafeUpdate(L2BlockInfo),
    /// The engine forkchoice was updated; carries the finalized L2 head.
    ForkchoiceUpdated(L2BlockInfo),
}

impl ChainHeadEvent {
    /// The stable name of the event, for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::L1Unsafe(_) => "l1-unsafe",
            Self::PendingSafeUpdate(_) => "pending-safe-update",
            Self::ForkchoiceUpdated(_) => "forkchoice-updated",
        }
    }
}

impl core::fmt::Display for ChainHeadEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
