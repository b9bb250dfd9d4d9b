//! Beacon API types for the proposer lookahead.

use alloc::vec::Vec;
use alloy_primitives::FixedBytes;

/// A BLS12-381 public key identifying an L1 validator.
pub type BlsPubkey = FixedBytes<48>;

/// A single proposer duty from the beacon lookahead.
///
/// Returned by `GET /eth/v1/validator/duties/proposer/{epoch}`; the beacon
/// API encodes the integer fields as decimal strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValidatorDuty {
    /// The public key of the validator assigned to the slot.
    pub pubkey: BlsPubkey,
    /// The index of the validator on the beacon chain.
    #[cfg_attr(feature = "serde", serde(with = "dec_string"))]
    pub validator_index: u64,
    /// The slot the validator is expected to propose in.
    #[cfg_attr(feature = "serde", serde(with = "dec_string"))]
    pub slot: u64,
}

/// The envelope of the proposer duties endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LookaheadResponse {
    /// The ordered duties covering the requested epoch.
    pub data: Vec<ValidatorDuty>,
}

/// Serde helper for the beacon API's decimal-string integers.
#[cfg(feature = "serde")]
mod dec_string {
    use alloc::string::{String, ToString};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<u64, D::Error> {
        String::deserialize(deserializer)?.parse().map_err(de::Error::custom)
    }
}
