//! Test utilities for the `ballot-election` crate.

#![allow(missing_docs, unreachable_pub)]

use crate::{
    events::{ElectionEmitter, ElectionEvent},
    policy::FallbackRule,
    probes::SlotWinner,
    traits::{BeaconLookaheadProvider, EthCallProvider, ProbeCall},
};
use alloc::{
    boxed::Box,
    collections::VecDeque,
    format,
    string::String,
    sync::Arc,
    vec::Vec,
};
use alloy_eips::BlockNumberOrTag;
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolValue;
use async_trait::async_trait;
use ballot_primitives::{BlsPubkey, SlotTiming, ValidatorDuty};
use hashbrown::HashMap;
use spin::Mutex;
use thiserror::Error;

/// The error type shared by the test providers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TestProviderError(pub String);

/// A [BeaconLookaheadProvider] serving pre-programmed lookaheads.
#[derive(Debug, Clone)]
pub struct TestBeaconClient {
    pub timing: SlotTiming,
    pub lookaheads: HashMap<u64, Vec<ValidatorDuty>>,
}

impl TestBeaconClient {
    pub fn new(timing: SlotTiming) -> Self {
        Self { timing, lookaheads: HashMap::new() }
    }

    pub fn insert_lookahead(&mut self, epoch: u64, duties: Vec<ValidatorDuty>) {
        self.lookaheads.insert(epoch, duties);
    }
}

#[async_trait]
impl BeaconLookaheadProvider for TestBeaconClient {
    type Error = TestProviderError;

    fn timing(&self) -> SlotTiming {
        self.timing
    }

    async fn get_lookahead(&mut self, epoch: u64) -> Result<Vec<ValidatorDuty>, Self::Error> {
        self.lookaheads
            .get(&epoch)
            .cloned()
            .ok_or_else(|| TestProviderError(format!("no lookahead for epoch {epoch}")))
    }
}

/// An [EthCallProvider] replaying queued return values in order while
/// recording every call it serves.
#[derive(Debug, Default)]
pub struct TestCallProvider {
    pub returns: VecDeque<Result<Bytes, TestProviderError>>,
    pub calls: Vec<(ProbeCall, BlockNumberOrTag)>,
}

impl TestCallProvider {
    pub fn push_return(&mut self, data: Bytes) {
        self.returns.push_back(Ok(data));
    }

    pub fn push_error(&mut self, message: &str) {
        self.returns.push_back(Err(TestProviderError(message.into())));
    }
}

#[async_trait]
impl EthCallProvider for TestCallProvider {
    type Error = TestProviderError;

    async fn call(
        &mut self,
        msg: &ProbeCall,
        block: BlockNumberOrTag,
    ) -> Result<Bytes, Self::Error> {
        self.calls.push((msg.clone(), block));
        self.returns
            .pop_front()
            .unwrap_or_else(|| Err(TestProviderError("unexpected call".into())))
    }
}

/// An [ElectionEmitter] recording events into a shared buffer.
#[derive(Debug, Clone, Default)]
pub struct TestEmitter {
    events: Arc<Mutex<Vec<ElectionEvent>>>,
}

impl TestEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of the events emitted so far.
    pub fn events(&self) -> Vec<ElectionEvent> {
        self.events.lock().clone()
    }
}

impl ElectionEmitter for TestEmitter {
    fn emit(&mut self, event: ElectionEvent) {
        self.events.lock().push(event);
    }
}

/// Builds duties for consecutive slots starting at `first_slot`, with
/// pubkeys fabricated so that pubkey truncation recovers `operators`.
pub fn test_duties(first_slot: u64, operators: &[Address]) -> Vec<ValidatorDuty> {
    operators
        .iter()
        .enumerate()
        .map(|(i, operator)| {
            let mut pubkey = BlsPubkey::ZERO;
            pubkey[..20].copy_from_slice(operator.as_slice());
            ValidatorDuty {
                pubkey,
                validator_index: i as u64,
                slot: first_slot + i as u64,
            }
        })
        .collect()
}

/// ABI-encodes a ticket-accounting probe return.
pub fn encode_ticket_counts(counts: &[u64]) -> Bytes {
    counts.iter().map(|c| U256::from(*c)).collect::<Vec<_>>().abi_encode().into()
}

/// ABI-encodes a sequencing-config check probe return.
pub fn encode_seq_config_flags(flags: &[bool]) -> Bytes {
    flags.to_vec().abi_encode().into()
}

/// ABI-encodes a random-ticket probe return.
pub fn encode_slot_winners(pairs: &[(u64, Address)]) -> Bytes {
    pairs
        .iter()
        .map(|(time, winner)| SlotWinner { timestamp: U256::from(*time), winner: *winner })
        .collect::<Vec<_>>()
        .abi_encode()
        .into()
}

/// ABI-encodes an `electionFallbackList()` return.
pub fn encode_fallback_list(rules: &[FallbackRule]) -> Bytes {
    rules.iter().map(|r| *r as u8).collect::<Vec<_>>().abi_encode().into()
}
