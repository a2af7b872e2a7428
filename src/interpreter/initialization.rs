use jam_asm::ProgramImage;

use super::Interpreter;
use crate::consts::*;

impl<C, E> Interpreter<C, E> {
    /// Reset the machine for one invocation: build the standard memory
    /// layout from the image, write the encoded arguments into the
    /// argument region, zero the registers and seed the conventional ones,
    /// and set entry point and gas limit.
    pub fn init_invocation(
        &mut self,
        image: &ProgramImage,
        args: &[u8],
        entry_pc: u64,
        gas_limit: i64,
    ) {
        self.memory.init_layout(
            args,
            image.ro_data(),
            image.rw_data(),
            image.stack_size(),
            image.heap_pad(),
        );

        self.registers = [0; VM_REGISTER_COUNT];
        self.registers[REG_RA] = HALT_ADDRESS as u64;
        self.registers[REG_SP] = STACK_TOP as u64;
        self.registers[REG_A0] = ARGS_BASE as u64;
        self.registers[REG_A1] = args.len() as u64;

        self.pc = entry_pc;
        self.gas = gas_limit;
    }
}
