//! An alloy-backed implementation of the [EthCallProvider] trait.

use alloy_eips::BlockNumberOrTag;
use alloy_primitives::Bytes;
use alloy_provider::{Provider, ReqwestProvider};
use alloy_transport::{RpcError, TransportErrorKind};
use async_trait::async_trait;
use ballot_election::{EthCallProvider, ProbeCall};
use std::time::Duration;
use tracing::trace;

/// The default per-call deadline.
const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// An error produced by the [AlloyCallProvider].
#[derive(Debug, thiserror::Error)]
pub enum CallProviderError {
    /// The RPC transport failed.
    #[error("eth_call failed: {0}")]
    Transport(#[from] RpcError<TransportErrorKind>),
    /// The per-call deadline expired.
    #[error("eth_call timed out after {0:?}")]
    DeadlineExceeded(Duration),
}

/// An [EthCallProvider] issuing `eth_call` over JSON-RPC.
///
/// Probe messages are forwarded verbatim, including the absent `to` that
/// makes the endpoint execute creation code. The provider enforces a
/// per-call deadline and performs no retries.
#[derive(Debug, Clone)]
pub struct AlloyCallProvider {
    /// The inner Ethereum JSON-RPC provider.
    inner: ReqwestProvider,
    /// The per-call deadline.
    timeout: Duration,
}

impl AlloyCallProvider {
    /// Creates a new [AlloyCallProvider] with the given alloy provider.
    pub const fn new(inner: ReqwestProvider, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// Creates a new [AlloyCallProvider] from the provided [reqwest::Url].
    pub fn new_http(url: reqwest::Url) -> Self {
        Self::new(ReqwestProvider::new_http(url), DEFAULT_CALL_TIMEOUT)
    }
}

#[async_trait]
impl EthCallProvider for AlloyCallProvider {
    type Error = CallProviderError;

    async fn call(
        &mut self,
        msg: &ProbeCall,
        block: BlockNumberOrTag,
    ) -> Result<Bytes, Self::Error> {
        trace!(target: "eth_call", probe = msg.to.is_none(), %block, "Issuing eth_call");
        let request = self.inner.raw_request("eth_call".into(), (msg.clone(), block));
        match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(CallProviderError::DeadlineExceeded(self.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_probe_call_wire_shape() {
        // The endpoint expects a null `to` for creation probes.
        let probe = ProbeCall::probe(Bytes::from_static(&[0x60, 0x80]));
        let json = serde_json::to_value(&probe).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "from": "0x0000000000000000000000000000000000000000",
                "to": null,
                "data": "0x6080",
            })
        );

        let call = ProbeCall::call(
            address!("00000000000000000000000000000000000000ff"),
            Bytes::default(),
        );
        let json = serde_json::to_value(&call).unwrap();
        assert_eq!(json["to"], "0x00000000000000000000000000000000000000ff");
    }
}
