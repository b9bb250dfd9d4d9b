//! The per-epoch working state of the election computation.

use crate::errors::ElectionError;
use alloc::vec::Vec;
use alloy_primitives::{Address, U256};
use ballot_primitives::{ElectionWinner, SlotTiming, ValidatorDuty};
use hashbrown::HashMap;

/// The slate of winners under construction for one epoch.
///
/// A slate couples the winner list with the duty-operator list and the
/// shared ticket balances. It can only be built from vectors of equal
/// length, and all rule mutations go through its methods, which preserve
/// two invariants: an assigned slot is never overwritten, and every
/// ticket-consuming assignment decrements the operator's balance.
#[derive(Debug, Clone)]
pub(crate) struct EpochSlate {
    winners: Vec<ElectionWinner>,
    operators: Vec<Address>,
    tickets: HashMap<Address, U256>,
}

impl EpochSlate {
    /// Builds a slate from the epoch's duties and the parallel ticket counts.
    ///
    /// The expected parent time of slot `i` is `l2_parent_time` for the
    /// first slot and the previous slot's time afterwards; `parent_slot`
    /// is only recorded when the slot lands exactly one L2 block after its
    /// parent, and is zero (unknown) otherwise.
    pub(crate) fn new(
        duties: &[ValidatorDuty],
        operators: Vec<Address>,
        ticket_counts: Vec<U256>,
        timing: SlotTiming,
        l2_parent_time: u64,
        l2_block_time: u64,
    ) -> Result<Self, ElectionError> {
        if operators.len() != duties.len() {
            return Err(ElectionError::LengthMismatch {
                expected: duties.len(),
                got: operators.len(),
            });
        }
        if ticket_counts.len() != duties.len() {
            return Err(ElectionError::LengthMismatch {
                expected: duties.len(),
                got: ticket_counts.len(),
            });
        }

        // Tickets are shared across all slots an operator holds in the
        // epoch; the first occurrence wins.
        let mut tickets = HashMap::new();
        for (operator, count) in operators.iter().zip(ticket_counts.iter()) {
            tickets.entry(*operator).or_insert(*count);
        }

        let mut winners = Vec::with_capacity(duties.len());
        let mut parent_time = l2_parent_time;
        for duty in duties {
            let time = timing.time_of_slot(duty.slot);
            let parent_slot = if time == parent_time + l2_block_time { parent_time } else { 0 };
            winners.push(ElectionWinner::new(Address::ZERO, time, parent_slot));
            parent_time = time;
        }

        Ok(Self { winners, operators, tickets })
    }

    /// The number of slots in the epoch.
    pub(crate) fn len(&self) -> usize {
        self.winners.len()
    }

    /// Returns `true` if the slot already has a winner.
    pub(crate) fn is_assigned(&self, slot: usize) -> bool {
        !self.winners[slot].address.is_zero()
    }

    /// The duty operator of the slot.
    pub(crate) fn operator(&self, slot: usize) -> Address {
        self.operators[slot]
    }

    /// The remaining ticket balance of an operator.
    pub(crate) fn tickets_of(&self, operator: Address) -> U256 {
        self.tickets.get(&operator).copied().unwrap_or(U256::ZERO)
    }

    /// Returns `true` if the operator holds at least one ticket.
    pub(crate) fn has_tickets(&self, operator: Address) -> bool {
        !self.tickets_of(operator).is_zero()
    }

    /// Assigns `operator` to `slot`, consuming one of its tickets.
    ///
    /// No-op (returning `false`) if the slot already has a winner or the
    /// operator holds no tickets.
    pub(crate) fn assign(&mut self, slot: usize, operator: Address) -> bool {
        if self.is_assigned(slot) {
            return false;
        }
        if let Some(count) = self.tickets.get_mut(&operator) {
            if count.is_zero() {
                return false;
            }
            *count -= U256::from(1);
            self.winners[slot].address = operator;
            return true;
        }
        false
    }

    /// Assigns a winner by slot timestamp without touching tickets.
    ///
    /// Used by the random-ticket rule, whose probe accounts for tickets on
    /// the contract side. Zero addresses and unknown timestamps are
    /// ignored, as are slots that already have a winner.
    pub(crate) fn assign_at_time(&mut self, time: u64, operator: Address) -> bool {
        if operator.is_zero() {
            return false;
        }
        if let Some(winner) = self.winners.iter_mut().find(|w| w.time == time) {
            if winner.address.is_zero() {
                winner.address = operator;
                return true;
            }
        }
        false
    }

    /// Scans slots after `slot` for the first duty operator with tickets.
    pub(crate) fn next_ticket_holder(&self, slot: usize) -> Option<Address> {
        self.operators[slot + 1..].iter().copied().find(|op| self.has_tickets(*op))
    }

    /// The timestamps of slots that still have no winner, in slot order.
    pub(crate) fn unassigned_times(&self) -> Vec<u64> {
        self.winners.iter().filter(|w| w.address.is_zero()).map(|w| w.time).collect()
    }

    /// Consumes the slate and yields the winner list.
    pub(crate) fn into_winners(self) -> Vec<ElectionWinner> {
        self.winners
    }

    /// The winner list under construction.
    #[cfg(test)]
    pub(crate) fn winners(&self) -> &[ElectionWinner] {
        &self.winners
    }
}
