use jam_asm::RegId;

use super::Interpreter;
use crate::state::{ExecuteState, Interrupt};

pub(crate) mod muldiv;

impl<C, E> Interpreter<C, E> {
    /// Write a 64-bit result and advance.
    pub(crate) fn alu_64(
        &mut self,
        d: RegId,
        value: u64,
    ) -> Result<ExecuteState, Interrupt> {
        self.write_reg(d, value);
        self.inc_pc();
        Ok(ExecuteState::Proceed)
    }

    /// Write a 32-bit result sign-extended from bit 31 and advance; the
    /// write-back discipline of every `…_32` instruction.
    pub(crate) fn alu_32(
        &mut self,
        d: RegId,
        value: u32,
    ) -> Result<ExecuteState, Interrupt> {
        self.alu_64(d, value as i32 as u64)
    }
}
