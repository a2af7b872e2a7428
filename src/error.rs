//! Invocation error implementation

use jam_asm::ProgramError;

use crate::state::ExitReason;

/// Error face of an invocation result. Successful halts carry a result
/// blob instead; everything abnormal collapses to one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InvocationError {
    /// Structural violation, page fault, or a malformed program image.
    #[error("the invocation panicked")]
    Panic,
    /// Gas underflow; the whole gas limit is reported as consumed.
    #[error("the invocation ran out of gas")]
    OutOfGas,
}

impl From<ProgramError> for InvocationError {
    fn from(_: ProgramError) -> Self {
        Self::Panic
    }
}

impl ExitReason {
    /// Collapse an exit reason into the invocation error face.
    ///
    /// Page faults collapse to panics here; callers driving the execution
    /// loop directly still see the faulting address.
    pub fn into_invocation_error(self) -> Option<InvocationError> {
        match self {
            Self::Halt => None,
            Self::Panic(_) | Self::PageFault(_) => Some(InvocationError::Panic),
            Self::OutOfGas => Some(InvocationError::OutOfGas),
        }
    }
}
