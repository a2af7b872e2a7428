//! Host-call bridge between the execution loop and the external mutator.

use jam_asm::Word;

use super::Interpreter;
use crate::host::{HostCallView, HostHandler};
use crate::state::HostOutcome;

impl<C, E> Interpreter<C, E>
where
    E: HostHandler<C>,
{
    /// Hand one host call to the mutator with a borrowed view of the
    /// machine. The program counter still sits on the `ecalli`; the run
    /// loop advances it if the outcome is a continue.
    pub(crate) fn dispatch_host(&mut self, id: Word) -> HostOutcome {
        tracing::debug!(id, gas = self.gas, "host call");

        self.host.host_call(
            id,
            HostCallView {
                registers: &mut self.registers,
                memory: &mut self.memory,
                gas: &mut self.gas,
                context: &mut self.context,
            },
        )
    }
}
