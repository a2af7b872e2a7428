//! Instruction-set primitives of the JAM PVM.
//!
//! This crate owns everything about the *shape* of PVM programs: the opcode
//! universe, operand formats and their decoding rules, the instruction
//! stream (code, opcode bitmask, skip values, basic blocks, jump table),
//! the program-image parser, and byte-level instruction encoders. The
//! machine that executes these streams lives in the `jam-pvm` crate.

#![warn(missing_docs)]

pub mod args;
pub mod conv;
pub mod disasm;
pub mod op;

mod opcode;
mod program;

pub use args::RegId;
pub use opcode::{Opcode, OperandsFormat};
pub use op::ProgramBuilder;
pub use program::{skip_at, Program, ProgramError, ProgramImage, CODE_PADDING, MASK_PADDING, MAX_SKIP};

/// Machine word: registers are 64-bit unsigned.
pub type Word = u64;

/// Panic reasons of the machine, shared between the interpreter and its
/// embedders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum PanicReason {
    /// A `trap` instruction was executed.
    Trap,
    /// The program counter left the instruction stream or does not sit on
    /// an opcode-bitmask boundary.
    InvalidInstructionAddress,
    /// The byte at the program counter maps onto no known opcode.
    UnknownOpcode,
    /// A static branch or table-resolved jump targeted a position outside
    /// the basic-block set.
    InvalidJumpTarget,
    /// An indirect jump computed a zero, misaligned or out-of-table
    /// dynamic address.
    MalformedDynamicJump,
    /// A load or store touched the unmapped low guard zone.
    GuardZoneAccess,
    /// The host handler terminated the invocation with a panic.
    HostAbort,
}

impl core::fmt::Display for PanicReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for PanicReason {}
