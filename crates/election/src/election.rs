//! The per-epoch election computation.

use crate::{
    config::ElectionConfig,
    errors::{ElectionError, ElectionResult},
    instructions,
    policy::{self, FallbackRule},
    probes::{self, SlotWinner},
    slate::EpochSlate,
    traits::{BeaconLookaheadProvider, EthCallProvider, ProbeCall, PubkeyToOperator},
};
use alloc::{string::ToString, vec::Vec};
use alloy_eips::BlockNumberOrTag;
use alloy_primitives::{Address, U256};
use ballot_primitives::{ElectionWinner, SlotTiming, SlotTimingError};
use tracing::{debug, warn};

/// The election computation.
///
/// Turns `(epoch, heads)` into the per-slot winner list for the epoch by
/// combining the beacon lookahead, the L2 ticket balances, and the
/// fallback program stored in the L1 system config. The computation is a
/// pure function of its chain inputs: re-running it with identical inputs
/// yields an identical winner list.
#[derive(Debug)]
pub struct Election<B, L1, L2, M = crate::traits::TruncatedPubkey> {
    /// The beacon lookahead client.
    beacon: B,
    /// The L1 execution endpoint, for the system config and its probes.
    l1: L1,
    /// The L2 execution endpoint, for ticket accounting probes.
    l2: L2,
    /// The pubkey-to-operator mapping strategy.
    mapper: M,
    /// The deployment parameters.
    cfg: ElectionConfig,
}

impl<B, L1, L2> Election<B, L1, L2> {
    /// Creates a new [Election] with the default pubkey truncation mapping.
    pub const fn new(beacon: B, l1: L1, l2: L2, cfg: ElectionConfig) -> Self {
        Self { beacon, l1, l2, mapper: crate::traits::TruncatedPubkey, cfg }
    }
}

impl<B, L1, L2, M> Election<B, L1, L2, M> {
    /// Creates a new [Election] with a custom [PubkeyToOperator] strategy.
    pub const fn with_mapper(beacon: B, l1: L1, l2: L2, mapper: M, cfg: ElectionConfig) -> Self {
        Self { beacon, l1, l2, mapper, cfg }
    }

    /// The deployment parameters of the election.
    pub const fn config(&self) -> &ElectionConfig {
        &self.cfg
    }

    /// The beacon lookahead client.
    pub const fn beacon(&self) -> &B {
        &self.beacon
    }

    /// The L1 execution endpoint.
    pub const fn l1_provider(&self) -> &L1 {
        &self.l1
    }

    /// The L2 execution endpoint.
    pub const fn l2_provider(&self) -> &L2 {
        &self.l2
    }
}

impl<B, L1, L2, M> Election<B, L1, L2, M>
where
    B: BeaconLookaheadProvider,
    L1: EthCallProvider,
    L2: EthCallProvider,
    M: PubkeyToOperator,
{
    /// The timing parameters of the consensus chain.
    pub fn timing(&self) -> SlotTiming {
        self.beacon.timing()
    }

    /// Returns the epoch containing the slot at `timestamp`.
    pub fn epoch_of(&self, timestamp: u64) -> Result<u64, SlotTimingError> {
        self.beacon.epoch_of(timestamp)
    }

    /// Computes the election winners for every slot of `epoch`.
    ///
    /// ## Takes
    /// - `epoch`: the epoch to compute winners for.
    /// - `l2_block`: the L2 block number at which ticket state is read.
    /// - `l2_parent_time`: the timestamp of the most recent known L2 block.
    /// - `l1_block`: the L1 block number at which the fallback program and
    ///   the sequencing-config checks are evaluated.
    ///
    /// ## Returns
    /// The winner list in slot order, one entry per slot of the epoch.
    /// Slots no rule could assign keep a zero address and are missed.
    pub async fn compute_winners(
        &mut self,
        epoch: u64,
        l2_block: u64,
        l2_parent_time: u64,
        l1_block: u64,
    ) -> ElectionResult<Vec<ElectionWinner>> {
        let timing = self.beacon.timing();
        let duties = self
            .beacon
            .get_lookahead(epoch)
            .await
            .map_err(|e| ElectionError::Transport(e.to_string()).temp())?;
        let expected = timing.slots_per_epoch as usize;
        if duties.len() != expected {
            return Err(ElectionError::MissingDuties { expected, got: duties.len() }.crit());
        }

        let operators =
            duties.iter().map(|d| self.mapper.operator_address(&d.pubkey)).collect::<Vec<_>>();
        let tickets = self.ticket_accounting(&operators, l2_block).await?;
        let program = self.fallback_program(l1_block).await?;

        let mut slate = EpochSlate::new(
            &duties,
            operators,
            tickets,
            timing,
            l2_parent_time,
            self.cfg.l2_block_time,
        )?;

        for rule in program {
            debug!(target: "election", rule = rule.name(), "Applying fallback rule");
            self.apply_rule(rule, &mut slate, l1_block, l2_block).await?;
        }

        Ok(slate.into_winners())
    }

    /// Dispatches a single fallback rule against the slate.
    async fn apply_rule(
        &mut self,
        rule: FallbackRule,
        slate: &mut EpochSlate,
        l1_block: u64,
        l2_block: u64,
    ) -> ElectionResult<()> {
        match rule {
            FallbackRule::CurrentProposer => instructions::apply_current_proposer(slate),
            FallbackRule::NextProposer => instructions::apply_next_proposer(slate),
            FallbackRule::CurrentProposerWithConfig => {
                let candidates = instructions::current_candidates(slate);
                let passed = self.check_seq_config(&candidates, l1_block).await?;
                instructions::apply_config_filtered(slate, &candidates, &passed);
            }
            FallbackRule::NextProposerWithConfig => {
                let candidates = instructions::next_candidates(slate);
                let passed = self.check_seq_config(&candidates, l1_block).await?;
                instructions::apply_config_filtered(slate, &candidates, &passed);
            }
            FallbackRule::RandomTicketHolder => {
                let times = slate.unassigned_times();
                if times.is_empty() {
                    return Ok(());
                }
                let pairs = self.random_ticket_holders(&times, l2_block).await?;
                instructions::apply_random_winners(slate, &pairs);
            }
            FallbackRule::Permissionless => {
                warn!(target: "election", "PERMISSIONLESS fallback is reserved, skipping");
            }
            FallbackRule::NoFallback => return Err(ElectionError::PolicyInvalid.crit()),
        }
        Ok(())
    }

    /// Queries the L2 ticket-accounting probe for the operators' balances.
    async fn ticket_accounting(
        &mut self,
        operators: &[Address],
        l2_block: u64,
    ) -> ElectionResult<Vec<U256>> {
        let msg = ProbeCall::probe(probes::ticket_accounting_probe(
            &self.cfg.ticket_accounting_code,
            operators,
        ));
        let ret = self
            .l2
            .call(&msg, BlockNumberOrTag::Number(l2_block))
            .await
            .map_err(|e| ElectionError::Transport(e.to_string()).temp())?;
        let counts = probes::decode_ticket_counts(&ret, operators.len())?;
        debug!(target: "election", operators = operators.len(), "Fetched ticket accounting");
        Ok(counts)
    }

    /// Reads the fallback program from the L1 system config.
    async fn fallback_program(&mut self, l1_block: u64) -> ElectionResult<Vec<FallbackRule>> {
        let msg =
            ProbeCall::call(self.cfg.system_config_address, probes::fallback_list_calldata());
        let ret = self
            .l1
            .call(&msg, BlockNumberOrTag::Number(l1_block))
            .await
            .map_err(|e| ElectionError::Transport(e.to_string()).temp())?;
        let raw = probes::decode_fallback_list(&ret)?;
        Ok(policy::decode_program(&raw)?)
    }

    /// Runs the L1 sequencing-config check probe over the candidates.
    async fn check_seq_config(
        &mut self,
        candidates: &[Address],
        l1_block: u64,
    ) -> ElectionResult<Vec<bool>> {
        let msg = ProbeCall::probe(probes::seq_config_check_probe(
            &self.cfg.seq_config_check_code,
            self.cfg.system_config_address,
            candidates,
        ));
        let ret = self
            .l1
            .call(&msg, BlockNumberOrTag::Number(l1_block))
            .await
            .map_err(|e| ElectionError::Transport(e.to_string()).temp())?;
        Ok(probes::decode_seq_config_flags(&ret, candidates.len())?)
    }

    /// Queries the L2 random-ticket probe for the unassigned slot times.
    async fn random_ticket_holders(
        &mut self,
        times: &[u64],
        l2_block: u64,
    ) -> ElectionResult<Vec<SlotWinner>> {
        let msg =
            ProbeCall::probe(probes::random_ticket_probe(&self.cfg.random_ticket_code, times));
        let ret = self
            .l2
            .call(&msg, BlockNumberOrTag::Number(l2_block))
            .await
            .map_err(|e| ElectionError::Transport(e.to_string()).temp())?;
        Ok(probes::decode_slot_winners(&ret, times.len())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::ElectionErrorKind,
        test_utils::{
            encode_fallback_list, encode_seq_config_flags, encode_slot_winners,
            encode_ticket_counts, test_duties, TestBeaconClient, TestCallProvider,
        },
    };
    use alloy_primitives::address;

    const A: Address = address!("00000000000000000000000000000000000000aa");
    const B: Address = address!("00000000000000000000000000000000000000bb");

    const TIMING: SlotTiming = SlotTiming::new(0, 12, 8);

    fn election(
        beacon: TestBeaconClient,
        l1: TestCallProvider,
        l2: TestCallProvider,
    ) -> Election<TestBeaconClient, TestCallProvider, TestCallProvider> {
        Election::new(beacon, l1, l2, ElectionConfig { l2_block_time: 12, ..Default::default() })
    }

    #[tokio::test]
    async fn test_compute_winners_current_proposer() {
        let mut beacon = TestBeaconClient::new(TIMING);
        // Epoch 1 covers slots 8..16; every duty maps to A.
        beacon.insert_lookahead(1, test_duties(8, &[A; 8]));

        let mut l1 = TestCallProvider::default();
        l1.push_return(encode_fallback_list(&[FallbackRule::CurrentProposer]));

        let mut l2 = TestCallProvider::default();
        l2.push_return(encode_ticket_counts(&[3; 8]));

        let mut election = election(beacon, l1, l2);
        let winners = election.compute_winners(1, 42, 84, 8).await.unwrap();

        assert_eq!(winners.len(), 8);
        // Three tickets cover the first three slots; the rest are missed.
        let expected =
            [A, A, A, Address::ZERO, Address::ZERO, Address::ZERO, Address::ZERO, Address::ZERO];
        assert_eq!(winners.iter().map(|w| w.address).collect::<Vec<_>>(), expected);
        // Times are equi-spaced by the slot interval, parents chain back
        // to the L2 head at 84.
        assert_eq!(winners[0].time, 96);
        assert_eq!(winners[7].time, 180);
        assert_eq!(winners[0].parent_slot, 84);
        assert_eq!(winners[1].parent_slot, 96);
    }

    #[tokio::test]
    async fn test_compute_winners_deterministic() {
        let mut beacon = TestBeaconClient::new(TIMING);
        beacon.insert_lookahead(1, test_duties(8, &[A; 8]));

        let run = |beacon: TestBeaconClient| async move {
            let mut l1 = TestCallProvider::default();
            l1.push_return(encode_fallback_list(&[FallbackRule::CurrentProposer]));
            let mut l2 = TestCallProvider::default();
            l2.push_return(encode_ticket_counts(&[3; 8]));
            let mut election = election(beacon, l1, l2);
            election.compute_winners(1, 42, 84, 8).await.unwrap()
        };

        let first = run(beacon.clone()).await;
        let second = run(beacon).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_compute_winners_with_config_rules() {
        let mut beacon = TestBeaconClient::new(TIMING);
        let mut operators = [A; 8];
        operators[4] = B;
        beacon.insert_lookahead(1, test_duties(8, &operators));

        let mut l1 = TestCallProvider::default();
        l1.push_return(encode_fallback_list(&[FallbackRule::CurrentProposerWithConfig]));
        // Only slots 0 and 4 pass the sequencing-config check.
        let mut passed = [false; 8];
        passed[0] = true;
        passed[4] = true;
        l1.push_return(encode_seq_config_flags(&passed));

        let mut l2 = TestCallProvider::default();
        let mut counts = [2u64; 8];
        counts[4] = 1;
        l2.push_return(encode_ticket_counts(&counts));

        let mut election = election(beacon, l1, l2);
        let winners = election.compute_winners(1, 42, 84, 8).await.unwrap();

        let addresses = winners.iter().map(|w| w.address).collect::<Vec<_>>();
        let zero = Address::ZERO;
        assert_eq!(addresses, [A, zero, zero, zero, B, zero, zero, zero]);
    }

    #[tokio::test]
    async fn test_compute_winners_random_fallback() {
        let mut beacon = TestBeaconClient::new(TIMING);
        beacon.insert_lookahead(1, test_duties(8, &[A; 8]));

        let mut l1 = TestCallProvider::default();
        l1.push_return(encode_fallback_list(&[
            FallbackRule::CurrentProposer,
            FallbackRule::RandomTicketHolder,
        ]));

        let mut l2 = TestCallProvider::default();
        let mut counts = [0u64; 8];
        counts[0] = 1;
        l2.push_return(encode_ticket_counts(&counts));
        // Slot 0 (time 96) is taken by CURRENT_PROPOSER; the probe covers
        // the remaining seven and elects B for time 108 only.
        let mut pairs = (1..8).map(|i| (96 + i * 12, Address::ZERO)).collect::<Vec<_>>();
        pairs[0].1 = B;
        l2.push_return(encode_slot_winners(&pairs));

        let mut election = election(beacon, l1, l2);
        let winners = election.compute_winners(1, 42, 84, 8).await.unwrap();

        assert_eq!(winners[0].address, A);
        assert_eq!(winners[1].address, B);
        assert!(winners[2..].iter().all(|w| w.is_missed()));
    }

    #[tokio::test]
    async fn test_compute_winners_policy_invalid() {
        let mut beacon = TestBeaconClient::new(TIMING);
        beacon.insert_lookahead(1, test_duties(8, &[A; 8]));

        let mut l1 = TestCallProvider::default();
        l1.push_return(encode_fallback_list(&[
            FallbackRule::CurrentProposer,
            FallbackRule::NoFallback,
        ]));

        let mut l2 = TestCallProvider::default();
        l2.push_return(encode_ticket_counts(&[3; 8]));

        let mut election = election(beacon, l1, l2);
        let err = election.compute_winners(1, 42, 84, 8).await.unwrap_err();
        assert_eq!(err, ElectionError::PolicyInvalid.crit());
    }

    #[tokio::test]
    async fn test_compute_winners_missing_duties() {
        let mut beacon = TestBeaconClient::new(TIMING);
        beacon.insert_lookahead(1, test_duties(8, &[A; 4]));

        let mut election =
            election(beacon, TestCallProvider::default(), TestCallProvider::default());
        let err = election.compute_winners(1, 42, 84, 8).await.unwrap_err();
        assert_eq!(err, ElectionError::MissingDuties { expected: 8, got: 4 }.crit());
    }

    #[tokio::test]
    async fn test_compute_winners_lookahead_transport_error() {
        let beacon = TestBeaconClient::new(TIMING);

        let mut election =
            election(beacon, TestCallProvider::default(), TestCallProvider::default());
        let err = election.compute_winners(1, 42, 84, 8).await.unwrap_err();
        assert!(matches!(err, ElectionErrorKind::Temporary(ElectionError::Transport(_))));
    }
}
