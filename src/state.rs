//! Runtime state representation for the VM

use jam_asm::{PanicReason, Word};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Resulting state of a single instruction execution.
pub enum ExecuteState {
    /// The VM should proceed normally with the execution.
    Proceed,
    /// An `ecalli` suspended the machine; the id is handed to the host
    /// handler and the program counter has not moved.
    Host(Word),
    /// An indirect jump hit the halt sentinel.
    Halt,
}

impl ExecuteState {
    /// Return true if the VM execution should continue.
    pub const fn should_continue(&self) -> bool {
        matches!(self, Self::Proceed)
    }
}

impl Default for ExecuteState {
    fn default() -> Self {
        Self::Proceed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Abnormal interruption raised while executing one instruction.
///
/// Interruptions are terminations, not recoverable errors: they exit the
/// execution loop immediately.
pub enum Interrupt {
    /// Structural violation.
    Panic(PanicReason),
    /// Memory access denied by page rights; carries the first denied byte.
    PageFault(u32),
    /// The gas counter went below zero.
    OutOfGas,
}

impl From<PanicReason> for Interrupt {
    fn from(reason: PanicReason) -> Self {
        Self::Panic(reason)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Why the execution loop stopped.
pub enum ExitReason {
    /// Normal successful termination.
    Halt,
    /// Structural violation: unknown opcode, program counter off the
    /// bitmask, invalid branch target, malformed indirect jump, guard-zone
    /// access, or an explicit `trap`.
    Panic(PanicReason),
    /// Memory access denied by page rights; carries the first denied byte.
    PageFault(u32),
    /// Gas underflow; all remaining gas is forfeited.
    OutOfGas,
}

impl ExitReason {
    /// Whether the invocation ended successfully.
    pub const fn is_halt(&self) -> bool {
        matches!(self, Self::Halt)
    }
}

impl From<Interrupt> for ExitReason {
    fn from(interrupt: Interrupt) -> Self {
        match interrupt {
            Interrupt::Panic(reason) => Self::Panic(reason),
            Interrupt::PageFault(address) => Self::PageFault(address),
            Interrupt::OutOfGas => Self::OutOfGas,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Verdict of the host handler after servicing one host call.
pub enum HostOutcome {
    /// Resume execution past the `ecalli`.
    Continue,
    /// Terminate the invocation successfully.
    Halt,
    /// Terminate with a panic.
    Panic,
    /// Terminate with a page fault at the given address.
    PageFault(u32),
    /// The surcharge exhausted the gas counter.
    OutOfGas,
}

impl HostOutcome {
    /// Return true if the VM execution should continue.
    pub const fn should_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }
}
