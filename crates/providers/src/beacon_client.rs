//! Contains an online implementation of the [BeaconLookaheadProvider] trait.

use async_trait::async_trait;
use ballot_election::BeaconLookaheadProvider;
use ballot_primitives::{LookaheadResponse, SlotTiming, ValidatorDuty};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// The proposer duties api method prefix.
pub(crate) const PROPOSER_DUTIES_METHOD_PREFIX: &str = "eth/v1/validator/duties/proposer";

/// The head header api method.
pub(crate) const HEAD_HEADER_METHOD: &str = "eth/v1/beacon/headers/head";

/// An error produced by the [OnlineBeaconClient].
#[derive(Debug, thiserror::Error)]
pub enum BeaconClientError {
    /// The HTTP request failed.
    #[error("Beacon request failed: {0}")]
    Request(reqwest::Error),
    /// The response body could not be decoded.
    #[error("Failed to decode beacon response: {0}")]
    Decode(reqwest::Error),
}

/// An online implementation of the [BeaconLookaheadProvider] trait.
#[derive(Debug, Clone)]
pub struct OnlineBeaconClient {
    /// The base URL of the beacon API.
    base: String,
    /// The timing parameters of the consensus chain.
    timing: SlotTiming,
    /// The inner reqwest client.
    inner: Client,
}

impl OnlineBeaconClient {
    /// Creates a new [OnlineBeaconClient] from the provided base URL.
    pub fn new_http(base: String, timing: SlotTiming) -> Self {
        Self { base, timing, inner: Client::new() }
    }

    /// Returns the slot of the current beacon head. Used by offline
    /// tooling to anchor lookahead queries; derivation never calls this.
    pub async fn head_slot(&self) -> Result<u64, BeaconClientError> {
        let response = self
            .inner
            .get(format!("{}/{}", self.base, HEAD_HEADER_METHOD))
            .send()
            .await
            .map_err(BeaconClientError::Request)?;
        let decoded =
            response.json::<ApiHeadResponse>().await.map_err(BeaconClientError::Decode)?;
        Ok(decoded.data.header.message.slot)
    }
}

#[async_trait]
impl BeaconLookaheadProvider for OnlineBeaconClient {
    type Error = BeaconClientError;

    fn timing(&self) -> SlotTiming {
        self.timing
    }

    async fn get_lookahead(&mut self, epoch: u64) -> Result<Vec<ValidatorDuty>, Self::Error> {
        let response = self
            .inner
            .get(format!("{}/{}/{}", self.base, PROPOSER_DUTIES_METHOD_PREFIX, epoch))
            .send()
            .await
            .map_err(BeaconClientError::Request)?;
        let decoded =
            response.json::<LookaheadResponse>().await.map_err(BeaconClientError::Decode)?;
        debug!(target: "beacon_client", epoch, duties = decoded.data.len(), "Fetched lookahead");
        Ok(decoded.data)
    }
}

#[derive(Debug, Deserialize)]
struct ApiHeadResponse {
    data: ApiHeadData,
}

#[derive(Debug, Deserialize)]
struct ApiHeadData {
    header: ApiHeader,
}

#[derive(Debug, Deserialize)]
struct ApiHeader {
    message: ApiHeaderMessage,
}

#[derive(Debug, Deserialize)]
struct ApiHeaderMessage {
    #[serde(with = "slot_string")]
    slot: u64,
}

/// The beacon API encodes slots as decimal strings.
mod slot_string {
    use serde::{de, Deserialize, Deserializer};

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<u64, D::Error> {
        String::deserialize(deserializer)?.parse().map_err(de::Error::custom)
    }
}
