//! Deterministic 64-bit PVM interpreter.
//!
//! A register machine over a variable-length instruction stream: 13
//! registers, signed gas counter, paged memory with per-page access
//! rights, basic-block-validated control flow, and a single suspension
//! point: the `ecalli` host call, serviced by a pluggable
//! [`HostHandler`](host::HostHandler). The
//! [`transactor`] module binds all of it into one invocation: decode a
//! program image, run, and collapse the outcome into gas consumed plus a
//! result blob or error.
//!
//! Every observable behavior is a pure function of the program image, the
//! gas limit, the argument bytes and the host handler's responses.

#![warn(missing_docs)]

pub mod consts;
pub mod error;
pub mod host;
pub mod interpreter;
pub mod memory;
pub mod state;
pub mod transactor;

pub mod prelude {
    //! Re-exports of the types most embedders touch.

    pub use jam_asm::{op, Opcode, PanicReason, Program, ProgramBuilder, ProgramError, ProgramImage, RegId, Word};

    pub use crate::consts::*;
    pub use crate::error::InvocationError;
    pub use crate::host::implications::{
        AccumulateContext, DeferredTransfer, Implications, ImplicationsPair, PartialState,
        Provision, ServiceAccount, ServiceId,
    };
    pub use crate::host::{no_host, HostCallView, HostFn, HostHandler};
    pub use crate::interpreter::Interpreter;
    pub use crate::memory::{AccessRights, Memory, MemoryFault};
    pub use crate::state::{ExecuteState, ExitReason, HostOutcome, Interrupt};
    pub use crate::transactor::{invoke, invoke_accumulate, InvocationResult};
}
