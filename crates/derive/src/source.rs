//! Election-gated admission of batch-submission transactions.

use alloc::vec::Vec;
use alloy_consensus::{ReceiptEnvelope, TxType};
use alloy_primitives::Address;
use alloy_sol_types::{sol, SolEvent};
use ballot_election::ElectionWinnerProvider;
use op_alloy_protocol::BlockInfo;
use tracing::{debug, warn};

sol! {
    /// Emitted by the batch inbox for every accepted batch submission.
    #[derive(Debug, PartialEq, Eq)]
    event BatchSubmitted(address indexed submitter);
}

/// Returns `true` if the receipt belongs to a batch submission by the
/// expected election winner.
///
/// The transaction must carry blob data, and some log of the receipt must
/// be a [BatchSubmitted] event emitted by the batch inbox whose indexed
/// submitter is `expected_winner`.
pub fn is_valid_batch_tx(
    receipt: &ReceiptEnvelope,
    batch_inbox_address: Address,
    expected_winner: Address,
) -> bool {
    if receipt.tx_type() != TxType::Eip4844 {
        warn!(target: "batch_validation", "Batch submission is not a blob tx, dropping");
        return false;
    }
    let Some(receipt) = receipt.as_receipt() else {
        return false;
    };
    receipt.logs.iter().any(|log| {
        log.address == batch_inbox_address
            && log.topics().len() > 1
            && log.topics()[0] == BatchSubmitted::SIGNATURE_HASH
            && Address::from_word(log.topics()[1]) == expected_winner
    })
}

/// Filters a batch-inbox block's transactions against the election store.
///
/// The derivation data source opens one validator per L1 block; the
/// expected winner is resolved by the block's timestamp. When the store
/// holds no winner for that timestamp the slot is missed and the whole
/// block yields no batch data.
#[derive(Debug, Clone)]
pub struct BatchSubmissionValidator<W> {
    /// The election winner view.
    winners: W,
    /// The address of the batch inbox contract.
    batch_inbox_address: Address,
}

impl<W: ElectionWinnerProvider> BatchSubmissionValidator<W> {
    /// Creates a new [BatchSubmissionValidator].
    pub const fn new(winners: W, batch_inbox_address: Address) -> Self {
        Self { winners, batch_inbox_address }
    }

    /// The election winner expected to submit batches in `block`.
    ///
    /// `None` for unknown timestamps and for slots stored as missed.
    pub fn expected_winner(&self, block: &BlockInfo) -> Option<Address> {
        let winner = self.winners.winner_by_time(block.timestamp)?;
        (!winner.is_missed()).then_some(winner.address)
    }

    /// Returns the indices of the receipts that are admissible batch
    /// submissions for `block`.
    pub fn admissible_txs(&self, block: &BlockInfo, receipts: &[ReceiptEnvelope]) -> Vec<usize> {
        let Some(expected) = self.expected_winner(block) else {
            debug!(
                target: "batch_validation",
                number = block.number,
                time = block.timestamp,
                "No election winner for block, rejecting all batch txs"
            );
            return Vec::new();
        };
        receipts
            .iter()
            .enumerate()
            .filter(|(_, receipt)| is_valid_batch_tx(receipt, self.batch_inbox_address, expected))
            .map(|(index, _)| index)
            .collect()
    }
}
