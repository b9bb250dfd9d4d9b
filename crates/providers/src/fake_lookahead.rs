//! A lookahead client with deterministically faked validator pubkeys.

use crate::beacon_client::{BeaconClientError, OnlineBeaconClient};
use alloy_primitives::Address;
use async_trait::async_trait;
use ballot_election::BeaconLookaheadProvider;
use ballot_primitives::{BlsPubkey, SlotTiming, ValidatorDuty};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// A [BeaconLookaheadProvider] for devnets whose validator set does not
/// control any operators.
///
/// Wraps the online client and rewrites every duty's pubkey with one
/// fabricated from the configured operator addresses, chosen by an RNG
/// seeded with the epoch number so that all nodes agree on the rewritten
/// lookahead.
#[derive(Debug, Clone)]
pub struct FakeLookaheadClient {
    /// The wrapped online client.
    inner: OnlineBeaconClient,
    /// The fabricated pubkeys to draw from.
    pubkeys: Vec<BlsPubkey>,
}

impl FakeLookaheadClient {
    /// Creates a new [FakeLookaheadClient] over the given operators.
    pub fn new(inner: OnlineBeaconClient, operators: &[Address]) -> Self {
        let pubkeys = operators.iter().map(|op| fake_pubkey_from_address(*op)).collect();
        Self { inner, pubkeys }
    }
}

/// Zero-pads an operator address into a 48-byte pubkey, the inverse of
/// the engine's pubkey-truncation operator mapping.
pub(crate) fn fake_pubkey_from_address(address: Address) -> BlsPubkey {
    let mut pubkey = BlsPubkey::ZERO;
    pubkey[..20].copy_from_slice(address.as_slice());
    pubkey
}

#[async_trait]
impl BeaconLookaheadProvider for FakeLookaheadClient {
    type Error = BeaconClientError;

    fn timing(&self) -> SlotTiming {
        self.inner.timing()
    }

    async fn get_lookahead(&mut self, epoch: u64) -> Result<Vec<ValidatorDuty>, Self::Error> {
        let mut duties = self.inner.get_lookahead(epoch).await?;
        if self.pubkeys.is_empty() {
            return Ok(duties);
        }
        let mut rng = StdRng::seed_from_u64(epoch);
        for duty in &mut duties {
            duty.pubkey = self.pubkeys[rng.gen_range(0..self.pubkeys.len())];
        }
        Ok(duties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_fake_pubkey_roundtrip() {
        let operator = address!("00000000000000000000000000000000000000aa");
        let pubkey = fake_pubkey_from_address(operator);
        assert_eq!(Address::from_slice(&pubkey[..20]), operator);
        assert!(pubkey[20..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_rewrite_deterministic_per_epoch() {
        let operators = [
            address!("00000000000000000000000000000000000000aa"),
            address!("00000000000000000000000000000000000000bb"),
            address!("00000000000000000000000000000000000000cc"),
        ];
        let pubkeys = operators.iter().map(|op| fake_pubkey_from_address(*op)).collect::<Vec<_>>();

        let draw = |epoch: u64| {
            let mut rng = StdRng::seed_from_u64(epoch);
            (0..32).map(|_| pubkeys[rng.gen_range(0..pubkeys.len())]).collect::<Vec<_>>()
        };
        assert_eq!(draw(7), draw(7));
        assert_ne!(draw(7), draw(8));
    }
}
