//! Error types for the `ballot-election` crate.

use alloc::string::String;
use ballot_primitives::SlotTimingError;
use thiserror::Error;

/// An error encountered while computing election winners.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElectionError {
    /// An RPC or HTTP backend call failed.
    #[error("Transport: {0}")]
    Transport(String),
    /// A response body or ABI payload could not be decoded.
    #[error("Decode: {0}")]
    Decode(String),
    /// Slot arithmetic was attempted on an invalid timestamp.
    #[error("Slot timing: {0}")]
    Timing(#[from] SlotTimingError),
    /// The fallback program contains `NO_FALLBACK`.
    #[error("Fallback program contains NO_FALLBACK")]
    PolicyInvalid,
    /// The fallback program contains an unrecognised opcode.
    #[error("Unknown fallback opcode: {0}")]
    PolicyUnknown(u8),
    /// A probe returned a result that is not parallel to its input.
    #[error("Probe result length mismatch: expected {expected}, got {got}")]
    LengthMismatch {
        /// The number of elements the probe was queried with.
        expected: usize,
        /// The number of elements the probe returned.
        got: usize,
    },
    /// The beacon lookahead did not cover the full epoch.
    #[error("Lookahead length mismatch: expected {expected} duties, got {got}")]
    MissingDuties {
        /// The configured number of slots per epoch.
        expected: usize,
        /// The number of duties returned.
        got: usize,
    },
}

impl ElectionError {
    /// Wrap [ElectionError] as an [ElectionErrorKind::Temporary].
    pub const fn temp(self) -> ElectionErrorKind {
        ElectionErrorKind::Temporary(self)
    }

    /// Wrap [ElectionError] as an [ElectionErrorKind::Critical].
    pub const fn crit(self) -> ElectionErrorKind {
        ElectionErrorKind::Critical(self)
    }
}

/// A top level filter for [ElectionError] that sorts by severity.
///
/// Temporary errors resolve themselves on a later driver event; critical
/// errors indicate a bug or an on-chain misconfiguration and will not
/// clear without intervention.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElectionErrorKind {
    /// A temporary error.
    #[error("Temporary error: {0}")]
    Temporary(#[source] ElectionError),
    /// A critical error.
    #[error("Critical error: {0}")]
    Critical(#[source] ElectionError),
}

impl From<ElectionError> for ElectionErrorKind {
    fn from(err: ElectionError) -> Self {
        match err {
            ElectionError::Transport(_) | ElectionError::Decode(_) => Self::Temporary(err),
            _ => Self::Critical(err),
        }
    }
}

/// A [Result] alias where the error is an [ElectionErrorKind].
pub type ElectionResult<T> = core::result::Result<T, ElectionErrorKind>;
