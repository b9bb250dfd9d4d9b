//! The fallback-rule implementations applied to an epoch slate.
//!
//! Rules are applied strictly left-to-right by the interpreter; within a
//! rule, slots are scanned in increasing index order and ticket decrements
//! are visible to the remaining slots of the same rule.

use crate::{probes::SlotWinner, slate::EpochSlate};
use alloc::vec::Vec;
use alloy_primitives::Address;
use tracing::warn;

/// `CURRENT_PROPOSER`: each unassigned slot goes to its own duty operator,
/// provided the operator still holds a ticket.
pub(crate) fn apply_current_proposer(slate: &mut EpochSlate) {
    for slot in 0..slate.len() {
        if slate.is_assigned(slot) {
            continue;
        }
        let operator = slate.operator(slot);
        slate.assign(slot, operator);
    }
}

/// `NEXT_PROPOSER`: for each unassigned slot whose duty operator holds no
/// tickets, the first later duty operator with a ticket wins the slot.
pub(crate) fn apply_next_proposer(slate: &mut EpochSlate) {
    for slot in 0..slate.len() {
        if slate.is_assigned(slot) {
            continue;
        }
        // A ticket-holding duty operator is handled by CURRENT_PROPOSER.
        if slate.has_tickets(slate.operator(slot)) {
            continue;
        }
        if let Some(next) = slate.next_ticket_holder(slot) {
            slate.assign(slot, next);
        }
    }
}

/// The per-slot candidates of `CURRENT_PROPOSER_WITH_CONFIG`: the duty
/// operator of every unassigned slot, zero for slots that already have a
/// winner.
pub(crate) fn current_candidates(slate: &EpochSlate) -> Vec<Address> {
    (0..slate.len())
        .map(|slot| if slate.is_assigned(slot) { Address::ZERO } else { slate.operator(slot) })
        .collect()
}

/// The per-slot candidates of `NEXT_PROPOSER_WITH_CONFIG`: the next
/// ticket-holding duty operator for every unassigned slot whose own
/// operator is ticketless, zero otherwise.
pub(crate) fn next_candidates(slate: &EpochSlate) -> Vec<Address> {
    (0..slate.len())
        .map(|slot| {
            if slate.is_assigned(slot) || slate.has_tickets(slate.operator(slot)) {
                return Address::ZERO;
            }
            slate.next_ticket_holder(slot).unwrap_or(Address::ZERO)
        })
        .collect()
}

/// Assigns the candidates that passed the sequencing-config check.
///
/// `candidates` and `passed` are parallel to the slate. Assignment
/// re-gates on a live ticket balance, so candidates shared by several
/// slots cannot overdraw their tickets.
pub(crate) fn apply_config_filtered(
    slate: &mut EpochSlate,
    candidates: &[Address],
    passed: &[bool],
) {
    debug_assert_eq!(candidates.len(), slate.len());
    debug_assert_eq!(passed.len(), slate.len());
    for slot in 0..slate.len() {
        if candidates[slot].is_zero() || !passed[slot] {
            continue;
        }
        slate.assign(slot, candidates[slot]);
    }
}

/// `RANDOM_TICKET_HOLDER`: merges the probe's `(timestamp, winner)` pairs
/// into the slate, skipping zero winners. Ticket accounting for this rule
/// happens inside the probe contract.
pub(crate) fn apply_random_winners(slate: &mut EpochSlate, pairs: &[SlotWinner]) {
    for pair in pairs {
        if pair.winner.is_zero() {
            continue;
        }
        let Ok(time) = u64::try_from(pair.timestamp) else {
            warn!(target: "election", "Random-ticket probe returned an out-of-range timestamp");
            continue;
        };
        if !slate.assign_at_time(time, pair.winner) {
            warn!(
                target: "election",
                time,
                "Random-ticket probe returned a winner for an unknown or assigned slot"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slate::EpochSlate;
    use alloc::vec;
    use alloy_primitives::{address, U256};
    use ballot_primitives::{SlotTiming, ValidatorDuty};

    const TIMING: SlotTiming = SlotTiming::new(0, 12, 8);

    const A: Address = address!("00000000000000000000000000000000000000aa");
    const B: Address = address!("00000000000000000000000000000000000000bb");

    /// Builds an eight-slot slate for epoch 1 (slots 8..16, times 96..192)
    /// with a continuous parent chain from 84.
    fn slate(operators: Vec<Address>, counts: Vec<u64>) -> EpochSlate {
        let duties = (8..16)
            .map(|slot| ValidatorDuty { slot, ..Default::default() })
            .collect::<Vec<_>>();
        let counts = counts.into_iter().map(U256::from).collect();
        EpochSlate::new(&duties, operators, counts, TIMING, 84, 12).unwrap()
    }

    fn addresses(slate: &EpochSlate) -> Vec<Address> {
        slate.winners().iter().map(|w| w.address).collect()
    }

    #[test]
    fn test_current_proposer_consumes_tickets() {
        // All eight duties map to A, which holds three tickets.
        let mut slate = slate(vec![A; 8], vec![3; 8]);
        apply_current_proposer(&mut slate);
        let zero = Address::ZERO;
        assert_eq!(addresses(&slate), [A, A, A, zero, zero, zero, zero, zero]);
        assert_eq!(slate.tickets_of(A), U256::ZERO);
    }

    #[test]
    fn test_current_proposer_idempotent() {
        let mut slate = slate(vec![A; 8], vec![3; 8]);
        apply_current_proposer(&mut slate);
        let first = addresses(&slate);
        apply_current_proposer(&mut slate);
        assert_eq!(addresses(&slate), first);
        assert_eq!(slate.tickets_of(A), U256::ZERO);
    }

    #[test]
    fn test_current_then_next_proposer() {
        // Duty 4 is B with one ticket; A holds two.
        let mut operators = vec![A; 8];
        operators[4] = B;
        let mut counts = vec![2; 8];
        counts[4] = 1;
        let mut slate = slate(operators, counts);

        apply_current_proposer(&mut slate);
        let zero = Address::ZERO;
        assert_eq!(addresses(&slate), [A, A, zero, zero, B, zero, zero, zero]);

        // No ticketed operator remains in the lookahead, so NEXT_PROPOSER
        // leaves every remaining slot unassigned.
        apply_next_proposer(&mut slate);
        assert_eq!(addresses(&slate), [A, A, zero, zero, B, zero, zero, zero]);
    }

    #[test]
    fn test_next_proposer_scans_forward() {
        // A is ticketless; B (duty 5) holds a single ticket.
        let mut operators = vec![A; 8];
        operators[5] = B;
        let mut counts = vec![0; 8];
        counts[5] = 1;
        let mut slate = slate(operators, counts);

        apply_next_proposer(&mut slate);
        let zero = Address::ZERO;
        // Slot 0 takes B's only ticket; later slots find nothing.
        assert_eq!(addresses(&slate), [B, zero, zero, zero, zero, zero, zero, zero]);
        assert_eq!(slate.tickets_of(B), U256::ZERO);
    }

    #[test]
    fn test_next_proposer_skips_ticketed_current() {
        // B (duty 0) holds tickets, so NEXT_PROPOSER leaves slot 0 to the
        // CURRENT_PROPOSER rule even if that rule never runs.
        let mut operators = vec![A; 8];
        operators[0] = B;
        let mut counts = vec![0; 8];
        counts[0] = 2;
        let mut slate = slate(operators, counts);

        apply_next_proposer(&mut slate);
        let zero = Address::ZERO;
        assert_eq!(addresses(&slate)[0], zero);
        // Ticketless slots after B's duty have no later holder.
        assert_eq!(slate.tickets_of(B), U256::from(2));
    }

    #[test]
    fn test_config_filtered_assignment() {
        let mut slate = slate(vec![A; 8], vec![8; 8]);
        let candidates = current_candidates(&slate);
        let mut passed = vec![false; 8];
        passed[1] = true;
        passed[3] = true;
        apply_config_filtered(&mut slate, &candidates, &passed);
        let zero = Address::ZERO;
        assert_eq!(addresses(&slate), [zero, A, zero, A, zero, zero, zero, zero]);
        assert_eq!(slate.tickets_of(A), U256::from(6));
    }

    #[test]
    fn test_next_candidates_share_tickets() {
        // Both slot 0 and slot 1 nominate B, which has a single ticket;
        // only the first assignment can succeed.
        let mut operators = vec![A; 8];
        operators[7] = B;
        let mut counts = vec![0; 8];
        counts[7] = 1;
        let mut slate = slate(operators, counts);

        let candidates = next_candidates(&slate);
        assert_eq!(candidates[0], B);
        assert_eq!(candidates[1], B);

        apply_config_filtered(&mut slate, &candidates, &vec![true; 8]);
        assert_eq!(addresses(&slate)[0], B);
        assert_eq!(addresses(&slate)[1], Address::ZERO);
        assert_eq!(slate.tickets_of(B), U256::ZERO);
    }

    #[test]
    fn test_random_winner_merge() {
        let mut slate = slate(vec![A; 8], vec![0; 8]);
        let pairs = vec![
            SlotWinner { timestamp: U256::from(108), winner: B },
            // Zero winners are skipped.
            SlotWinner { timestamp: U256::from(120), winner: Address::ZERO },
            // Unknown timestamps are ignored.
            SlotWinner { timestamp: U256::from(7), winner: B },
        ];
        apply_random_winners(&mut slate, &pairs);
        let zero = Address::ZERO;
        assert_eq!(addresses(&slate), [zero, B, zero, zero, zero, zero, zero, zero]);
    }
}
