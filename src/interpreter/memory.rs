use jam_asm::conv::{read_le, sext};
use jam_asm::{PanicReason, RegId, Word};

use super::Interpreter;
use crate::consts::GUARD_ZONE_SIZE;
use crate::state::{ExecuteState, Interrupt};

/// Effective address of the register-indirect forms: base plus immediate,
/// wrapped into the 32-bit address space.
pub(crate) fn effective(base: Word, imm: u64) -> u32 {
    base.wrapping_add(imm) as u32
}

/// The guard applies to every load and store, whatever its addressing
/// form: touching the lowest zone is a structural violation, not a fault.
fn guarded(address: u32) -> Result<(), Interrupt> {
    if address < GUARD_ZONE_SIZE {
        Err(PanicReason::GuardZoneAccess.into())
    } else {
        Ok(())
    }
}

impl<C, E> Interpreter<C, E> {
    /// Load `width` bytes into `dst`, zero- or sign-extending to 64 bits.
    pub(crate) fn load(
        &mut self,
        dst: RegId,
        address: u32,
        width: usize,
        sign_extend: bool,
    ) -> Result<ExecuteState, Interrupt> {
        guarded(address)?;

        let bytes = self
            .memory
            .read(address, width)
            .map_err(|fault| Interrupt::PageFault(fault.0))?;
        let mut value = read_le(&bytes);
        if sign_extend {
            value = sext(value, width);
        }
        self.write_reg(dst, value);
        self.inc_pc();
        Ok(ExecuteState::Proceed)
    }

    /// Store the low `width` bytes of `value`.
    pub(crate) fn store(
        &mut self,
        address: u32,
        value: Word,
        width: usize,
    ) -> Result<ExecuteState, Interrupt> {
        guarded(address)?;

        self.memory
            .write(address, &value.to_le_bytes()[..width])
            .map_err(|fault| Interrupt::PageFault(fault.0))?;
        self.inc_pc();
        Ok(ExecuteState::Proceed)
    }

    /// `sbrk`: grow the heap by the byte count in `a`, landing the new
    /// heap pointer (or 0 on exhaustion) in `d`.
    pub(crate) fn grow_heap(&mut self, d: RegId, a: RegId) -> Result<ExecuteState, Interrupt> {
        let pointer = self.memory.sbrk(self.reg(a));
        self.alu_64(d, pointer)
    }
}
