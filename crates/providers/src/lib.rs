#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod beacon_client;
pub use beacon_client::{BeaconClientError, OnlineBeaconClient};

mod fake_lookahead;
pub use fake_lookahead::FakeLookaheadClient;

mod eth_call;
pub use eth_call::{AlloyCallProvider, CallProviderError};
