#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod timing;
pub use timing::{SlotTiming, SlotTimingError};

mod winner;
pub use winner::ElectionWinner;

mod lookahead;
pub use lookahead::{BlsPubkey, LookaheadResponse, ValidatorDuty};
