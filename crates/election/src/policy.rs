//! The fallback-policy program read from the L1 system config.

use crate::errors::ElectionError;
use alloc::vec::Vec;

/// A single opcode of the fallback program.
///
/// The program is an ordered list of rules applied left-to-right by the
/// election computation, each progressively filling in winners for slots
/// the previous rules left unassigned. New rules are added by extending
/// this enum and its dispatch arm in the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FallbackRule {
    /// Terminator; must not appear inside a non-empty program.
    NoFallback = 0x00,
    /// The duty proposer wins its own slot if it holds a ticket.
    CurrentProposer = 0x01,
    /// [Self::CurrentProposer] gated by the sequencing-config check.
    CurrentProposerWithConfig = 0x02,
    /// The next ticket-holding proposer in the lookahead wins the slot.
    NextProposer = 0x03,
    /// [Self::NextProposer] gated by the sequencing-config check.
    NextProposerWithConfig = 0x04,
    /// A pseudo-random ticket holder chosen by the L2 random-ticket probe.
    RandomTicketHolder = 0x05,
    /// Reserved; anyone may submit. Currently a no-op.
    Permissionless = 0x06,
}

impl FallbackRule {
    /// Returns the human-readable name of the rule.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NoFallback => "NO_FALLBACK",
            Self::CurrentProposer => "CURRENT_PROPOSER",
            Self::CurrentProposerWithConfig => "CURRENT_PROPOSER_WITH_CONFIG",
            Self::NextProposer => "NEXT_PROPOSER",
            Self::NextProposerWithConfig => "NEXT_PROPOSER_WITH_CONFIG",
            Self::RandomTicketHolder => "RANDOM_TICKET_HOLDER",
            Self::Permissionless => "PERMISSIONLESS",
        }
    }
}

impl TryFrom<u8> for FallbackRule {
    type Error = ElectionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Self::NoFallback),
            0x01 => Ok(Self::CurrentProposer),
            0x02 => Ok(Self::CurrentProposerWithConfig),
            0x03 => Ok(Self::NextProposer),
            0x04 => Ok(Self::NextProposerWithConfig),
            0x05 => Ok(Self::RandomTicketHolder),
            0x06 => Ok(Self::Permissionless),
            _ => Err(ElectionError::PolicyUnknown(value)),
        }
    }
}

/// Decodes a raw `uint8[]` fallback program into rules.
///
/// Unknown opcodes fail the whole program; `NO_FALLBACK` decodes to a rule
/// and is rejected by the interpreter when it is applied, so that the
/// error surfaces with the winners of prior epochs intact.
pub(crate) fn decode_program(raw: &[u8]) -> Result<Vec<FallbackRule>, ElectionError> {
    raw.iter().map(|op| FallbackRule::try_from(*op)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_program() {
        let program = decode_program(&[0x01, 0x03, 0x05]).unwrap();
        assert_eq!(
            program,
            [
                FallbackRule::CurrentProposer,
                FallbackRule::NextProposer,
                FallbackRule::RandomTicketHolder
            ]
        );
    }

    #[test]
    fn test_decode_program_unknown_opcode() {
        assert_eq!(decode_program(&[0x01, 0x42]), Err(ElectionError::PolicyUnknown(0x42)));
    }

    #[test]
    fn test_decode_program_keeps_terminator() {
        // The interpreter, not the decoder, rejects NO_FALLBACK.
        let program = decode_program(&[0x01, 0x00]).unwrap();
        assert_eq!(program[1], FallbackRule::NoFallback);
    }
}
