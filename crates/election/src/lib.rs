#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod config;
pub use config::ElectionConfig;

mod errors;
pub use errors::{ElectionError, ElectionErrorKind, ElectionResult};

mod traits;
pub use traits::{
    BeaconLookaheadProvider, EthCallProvider, ProbeCall, PubkeyToOperator, TruncatedPubkey,
};

mod policy;
pub use policy::FallbackRule;

mod slate;

mod probes;

mod instructions;

mod election;
pub use election::Election;

mod store;
pub use store::ElectionStore;

mod client;
pub use client::{ElectionClient, ElectionWinnerProvider};

mod events;
pub use events::{ElectionEmitter, ElectionEvent, ElectionEventHandler};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
