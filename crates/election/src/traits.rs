//! Provider traits consumed by the election computation.

use alloc::{boxed::Box, vec::Vec};
use alloy_eips::BlockNumberOrTag;
use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use ballot_primitives::{BlsPubkey, SlotTiming, SlotTimingError, ValidatorDuty};
use core::fmt::Display;

/// A thin wrapper around the beacon API's proposer-duties endpoint.
///
/// The lookahead provider is the sole authority on slot and epoch
/// arithmetic: the conversions are provided methods on top of
/// [`timing`](Self::timing) so that online clients, fakes, and test doubles
/// agree bit-exactly.
#[async_trait]
pub trait BeaconLookaheadProvider {
    /// The error type for [BeaconLookaheadProvider] implementations.
    type Error: Display;

    /// Returns the timing parameters of the consensus chain.
    fn timing(&self) -> SlotTiming;

    /// Returns the ordered proposer duties covering the given epoch.
    async fn get_lookahead(&mut self, epoch: u64) -> Result<Vec<ValidatorDuty>, Self::Error>;

    /// Returns the epoch containing the slot at `timestamp`.
    fn epoch_of(&self, timestamp: u64) -> Result<u64, SlotTimingError> {
        self.timing().epoch_of(timestamp)
    }

    /// Returns the timestamp of the given slot.
    fn time_of_slot(&self, slot: u64) -> u64 {
        self.timing().time_of_slot(slot)
    }
}

/// A bare `eth_call` message.
///
/// When [`to`](Self::to) is `None`, [`data`](Self::data) is executed as
/// contract creation code and the call returns the memory the constructor
/// returns, which is how the election probes are queried.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProbeCall {
    /// The sender of the call.
    pub from: Address,
    /// The callee; `None` executes `data` as creation code.
    pub to: Option<Address>,
    /// Calldata, or creation code when `to` is `None`.
    pub data: Bytes,
}

impl ProbeCall {
    /// Creates a constructor probe message.
    pub const fn probe(code: Bytes) -> Self {
        Self { from: Address::ZERO, to: None, data: code }
    }

    /// Creates a plain contract call message.
    pub const fn call(to: Address, data: Bytes) -> Self {
        Self { from: Address::ZERO, to: Some(to), data }
    }
}

/// A read-only execution endpoint capable of serving `eth_call`.
///
/// Implementations perform no retries; callers classify failures.
#[async_trait]
pub trait EthCallProvider {
    /// The error type for [EthCallProvider] implementations.
    type Error: Display;

    /// Executes `msg` at the given block and returns the raw return data.
    async fn call(&mut self, msg: &ProbeCall, block: BlockNumberOrTag)
        -> Result<Bytes, Self::Error>;
}

/// The strategy mapping an L1 validator pubkey to its L2 operator account.
pub trait PubkeyToOperator {
    /// Returns the operator address controlled by the given validator.
    fn operator_address(&self, pubkey: &BlsPubkey) -> Address;
}

/// A [PubkeyToOperator] that truncates the pubkey to its first 20 bytes.
///
/// This mapping is not a cryptographic derivation and only holds on
/// devnets where pubkeys are fabricated from operator addresses (see the
/// fake lookahead client). Production deployments supply their own
/// strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct TruncatedPubkey;

impl PubkeyToOperator for TruncatedPubkey {
    fn operator_address(&self, pubkey: &BlsPubkey) -> Address {
        Address::from_slice(&pubkey[..20])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_truncated_pubkey() {
        let mut pubkey = BlsPubkey::ZERO;
        pubkey[..20].copy_from_slice(
            address!("00000000000000000000000000000000000000aa").as_slice(),
        );
        pubkey[20] = 0xFF;
        assert_eq!(
            TruncatedPubkey.operator_address(&pubkey),
            address!("00000000000000000000000000000000000000aa")
        );
    }

    #[test]
    fn test_probe_call_shapes() {
        let probe = ProbeCall::probe(Bytes::from_static(&[0x60, 0x80]));
        assert!(probe.to.is_none());

        let call = ProbeCall::call(Address::ZERO, Bytes::default());
        assert_eq!(call.to, Some(Address::ZERO));
    }
}
