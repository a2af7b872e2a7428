use crate::host::HostHandler;
use crate::interpreter::Interpreter;
use crate::state::{ExecuteState, ExitReason, HostOutcome};

use jam_asm::PanicReason;

impl<C, E> Interpreter<C, E>
where
    E: HostHandler<C>,
{
    /// Run until the machine terminates.
    ///
    /// Gas is the sole bound; a program that neither terminates nor runs
    /// out of gas loops here forever. Defensive callers use
    /// [`run_bounded`](Self::run_bounded).
    pub fn run(&mut self) -> ExitReason {
        loop {
            if let Some(exit) = self.advance() {
                return exit;
            }
        }
    }

    /// Run for at most `max_steps` instructions.
    ///
    /// Returns `None` when the cap is reached with the machine still
    /// runnable; the cap never fires a termination of its own, so it can
    /// never end an invocation before gas would.
    pub fn run_bounded(&mut self, max_steps: u64) -> Option<ExitReason> {
        for _ in 0..max_steps {
            if let Some(exit) = self.advance() {
                return Some(exit);
            }
        }
        None
    }

    /// One instruction, including host-call servicing.
    fn advance(&mut self) -> Option<ExitReason> {
        match self.step() {
            Ok(ExecuteState::Proceed) => None,
            Ok(ExecuteState::Halt) => Some(ExitReason::Halt),
            Ok(ExecuteState::Host(id)) => match self.dispatch_host(id) {
                HostOutcome::Continue => {
                    // Resume past the ecalli, which never advanced itself.
                    self.inc_pc();
                    None
                }
                HostOutcome::Halt => Some(ExitReason::Halt),
                HostOutcome::Panic => Some(ExitReason::Panic(PanicReason::HostAbort)),
                HostOutcome::PageFault(address) => Some(ExitReason::PageFault(address)),
                HostOutcome::OutOfGas => Some(ExitReason::OutOfGas),
            },
            Err(interrupt) => Some(interrupt.into()),
        }
    }
}
