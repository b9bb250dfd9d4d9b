//! ABI codecs for the election probe contracts and the system config.
//!
//! Probes are queried by executing their creation code through an
//! `eth_call` with no `to` address: the constructor computes the result
//! and returns it as the contract's creation output. The codecs here pair
//! each probe's constructor-argument encoding with the decoder for its
//! return memory, and enforce the shared parallel-array contract: a
//! probe's result indexes correspond one-to-one to its inputs.

use crate::errors::ElectionError;
use alloc::{string::ToString, vec::Vec};
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall, SolValue};

sol! {
    /// A `(timestamp, winner)` pair returned by the random-ticket probe.
    #[derive(Debug, Default, PartialEq, Eq)]
    struct SlotWinner {
        uint256 timestamp;
        address winner;
    }

    /// The fallback-program getter on the L1 system config.
    function electionFallbackList() external view returns (uint8[] memory);
}

/// Appends ABI-encoded constructor arguments to probe creation code.
fn with_args(code: &Bytes, args: Vec<u8>) -> Bytes {
    let mut data = Vec::with_capacity(code.len() + args.len());
    data.extend_from_slice(code);
    data.extend(args);
    data.into()
}

/// Creation code of the ticket-accounting probe for the given operators.
pub(crate) fn ticket_accounting_probe(code: &Bytes, operators: &[Address]) -> Bytes {
    with_args(code, operators.to_vec().abi_encode())
}

/// Decodes the `uint256[]` ticket balances, parallel to the queried operators.
pub(crate) fn decode_ticket_counts(
    data: &[u8],
    expected: usize,
) -> Result<Vec<U256>, ElectionError> {
    let counts = <Vec<U256>>::abi_decode(data, true)
        .map_err(|e| ElectionError::Decode(e.to_string()))?;
    if counts.len() != expected {
        return Err(ElectionError::LengthMismatch { expected, got: counts.len() });
    }
    Ok(counts)
}

/// Creation code of the sequencing-config check probe for the candidates.
pub(crate) fn seq_config_check_probe(
    code: &Bytes,
    system_config: Address,
    candidates: &[Address],
) -> Bytes {
    with_args(code, (system_config, candidates.to_vec()).abi_encode_params())
}

/// Decodes the `bool[]` check results, parallel to the queried candidates.
pub(crate) fn decode_seq_config_flags(
    data: &[u8],
    expected: usize,
) -> Result<Vec<bool>, ElectionError> {
    let flags =
        <Vec<bool>>::abi_decode(data, true).map_err(|e| ElectionError::Decode(e.to_string()))?;
    if flags.len() != expected {
        return Err(ElectionError::LengthMismatch { expected, got: flags.len() });
    }
    Ok(flags)
}

/// Creation code of the random-ticket probe for the given slot timestamps.
pub(crate) fn random_ticket_probe(code: &Bytes, timestamps: &[u64]) -> Bytes {
    let timestamps = timestamps.iter().map(|t| U256::from(*t)).collect::<Vec<_>>();
    with_args(code, timestamps.abi_encode())
}

/// Decodes the `(uint256,address)[]` pairs, parallel to the queried timestamps.
pub(crate) fn decode_slot_winners(
    data: &[u8],
    expected: usize,
) -> Result<Vec<SlotWinner>, ElectionError> {
    let pairs = <Vec<SlotWinner>>::abi_decode(data, true)
        .map_err(|e| ElectionError::Decode(e.to_string()))?;
    if pairs.len() != expected {
        return Err(ElectionError::LengthMismatch { expected, got: pairs.len() });
    }
    Ok(pairs)
}

/// Calldata for `electionFallbackList()`.
pub(crate) fn fallback_list_calldata() -> Bytes {
    electionFallbackListCall {}.abi_encode().into()
}

/// Decodes the raw `uint8[]` fallback program.
pub(crate) fn decode_fallback_list(data: &[u8]) -> Result<Vec<u8>, ElectionError> {
    electionFallbackListCall::abi_decode_returns(data, true)
        .map(|ret| ret._0)
        .map_err(|e| ElectionError::Decode(e.to_string()))
}
