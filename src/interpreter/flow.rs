use jam_asm::PanicReason;

use super::Interpreter;
use crate::consts::{HALT_ADDRESS, JUMP_ALIGNMENT};
use crate::state::{ExecuteState, Interrupt};

impl<C, E> Interpreter<C, E> {
    /// Conditional transfer by a PC-relative offset. Not-taken branches
    /// fall through; taken branches land on a validated basic-block start.
    pub(crate) fn branch(
        &mut self,
        offset: i64,
        taken: bool,
    ) -> Result<ExecuteState, Interrupt> {
        if taken {
            let target = self.pc.wrapping_add_signed(offset);
            self.jump_to(target)
        } else {
            self.inc_pc();
            Ok(ExecuteState::Proceed)
        }
    }

    /// Transfer control to an absolute code position.
    ///
    /// Every way of setting the program counter funnels through here, so a
    /// target outside the basic-block set can never be reached.
    pub(crate) fn jump_to(&mut self, target: u64) -> Result<ExecuteState, Interrupt> {
        if self.program.is_block_start(target) {
            self.pc = target;
            Ok(ExecuteState::Proceed)
        } else {
            Err(PanicReason::InvalidJumpTarget.into())
        }
    }

    /// Indirect jump through the jump table.
    ///
    /// The halt sentinel terminates the invocation without any table or
    /// block validation. A zero, misaligned or out-of-table address panics;
    /// otherwise the table entry is validated like a static target.
    pub(crate) fn jump_dynamic(&mut self, address: u64) -> Result<ExecuteState, Interrupt> {
        if address == HALT_ADDRESS as u64 {
            return Ok(ExecuteState::Halt);
        }

        let entries = self.program.jump_table().len() as u64;
        if address == 0 || address > JUMP_ALIGNMENT * entries || address % JUMP_ALIGNMENT != 0 {
            return Err(PanicReason::MalformedDynamicJump.into());
        }

        let target = self.program.jump_table()[(address / JUMP_ALIGNMENT - 1) as usize];
        self.jump_to(target as u64)
    }
}
