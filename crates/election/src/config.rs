//! Configuration for the election computation.

use alloy_primitives::{Address, Bytes};

/// The deployment-specific parameters of the election engine.
///
/// The probe fields carry the creation bytecode of the three auxiliary
/// contracts. Probes are never deployed: their initcode is executed via an
/// `eth_call` with no `to` address and the constructor's return memory is
/// the query result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElectionConfig {
    /// Seconds between consecutive L2 blocks.
    pub l2_block_time: u64,
    /// The L1 system config holding the fallback program and the
    /// sequencing configuration consulted by the `*_WITH_CONFIG` rules.
    pub system_config_address: Address,
    /// Initcode of the L2 ticket-accounting probe.
    pub ticket_accounting_code: Bytes,
    /// Initcode of the L2 random-ticket probe.
    pub random_ticket_code: Bytes,
    /// Initcode of the L1 sequencing-config check probe.
    pub seq_config_check_code: Bytes,
}
