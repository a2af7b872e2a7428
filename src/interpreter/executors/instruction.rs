use jam_asm::conv::sext;
use jam_asm::{args, Opcode, PanicReason};

use super::super::alu::muldiv;
use super::super::memory::effective;
use crate::interpreter::Interpreter;
use crate::state::{ExecuteState, Interrupt};

impl<C, E> Interpreter<C, E> {
    /// Execute the instruction at the current program counter.
    ///
    /// Fetch order: the position must be a bitmask boundary, the byte
    /// there must map onto the opcode universe, and only then is one unit
    /// of gas charged and the instruction dispatched.
    pub fn step(&mut self) -> Result<ExecuteState, Interrupt> {
        let pc = self.pc();

        if !self.program().is_opcode_boundary(pc) {
            return Err(PanicReason::InvalidInstructionAddress.into());
        }
        let opcode = self
            .program()
            .opcode_at(pc)
            .ok_or(PanicReason::UnknownOpcode)?;

        self.set_gas(self.gas() - 1);
        if self.gas() < 0 {
            return Err(Interrupt::OutOfGas);
        }

        tracing::trace!(pc, op = opcode.mnemonic(), gas = self.gas(), "step");

        self.instruction(opcode, pc)
    }

    fn instruction(&mut self, op: Opcode, pc: u64) -> Result<ExecuteState, Interrupt> {
        use Opcode::*;

        let ops = self.program().operands(pc);

        match op {
            Trap => Err(PanicReason::Trap.into()),

            Fallthrough => {
                self.inc_pc();
                Ok(ExecuteState::Proceed)
            }

            Ecalli => Ok(ExecuteState::Host(args::one_imm(ops))),

            LoadImm64 => {
                let (a, value) = args::reg_ext_imm(ops);
                self.alu_64(a, value)
            }

            StoreImmU8 | StoreImmU16 | StoreImmU32 | StoreImmU64 => {
                let (x, y) = args::two_imms(ops);
                self.store(x as u32, y, store_width(op))
            }

            Jump => {
                let offset = args::one_offset(ops);
                self.branch(offset, true)
            }

            JumpInd => {
                let (a, imm) = args::reg_imm(ops);
                let address = effective(self.reg(a), imm);
                self.jump_dynamic(address as u64)
            }

            LoadImm => {
                let (a, imm) = args::reg_imm(ops);
                self.alu_64(a, imm)
            }

            LoadU8 | LoadI8 | LoadU16 | LoadI16 | LoadU32 | LoadI32 | LoadU64 => {
                let (a, imm) = args::reg_imm(ops);
                self.load(a, imm as u32, load_width(op), load_signed(op))
            }

            StoreU8 | StoreU16 | StoreU32 | StoreU64 => {
                let (a, imm) = args::reg_imm(ops);
                self.store(imm as u32, self.reg(a), store_width(op))
            }

            StoreImmIndU8 | StoreImmIndU16 | StoreImmIndU32 | StoreImmIndU64 => {
                let (a, x, y) = args::reg_two_imms(ops);
                self.store(effective(self.reg(a), x), y, store_width(op))
            }

            LoadImmJump => {
                let (a, imm, offset) = args::reg_imm_offset(ops);
                self.write_reg(a, imm);
                self.branch(offset, true)
            }

            BranchEqImm | BranchNeImm | BranchLtUImm | BranchLeUImm | BranchGeUImm
            | BranchGtUImm | BranchLtSImm | BranchLeSImm | BranchGeSImm | BranchGtSImm => {
                let (a, imm, offset) = args::reg_imm_offset(ops);
                let lhs = self.reg(a);
                let taken = match op {
                    BranchEqImm => lhs == imm,
                    BranchNeImm => lhs != imm,
                    BranchLtUImm => lhs < imm,
                    BranchLeUImm => lhs <= imm,
                    BranchGeUImm => lhs >= imm,
                    BranchGtUImm => lhs > imm,
                    BranchLtSImm => (lhs as i64) < imm as i64,
                    BranchLeSImm => lhs as i64 <= imm as i64,
                    BranchGeSImm => lhs as i64 >= imm as i64,
                    _ => lhs as i64 > imm as i64,
                };
                self.branch(offset, taken)
            }

            MoveReg => {
                let (d, a) = args::two_regs(ops);
                self.alu_64(d, self.reg(a))
            }

            Sbrk => {
                let (d, a) = args::two_regs(ops);
                self.grow_heap(d, a)
            }

            CountSetBits64 => {
                let (d, a) = args::two_regs(ops);
                self.alu_64(d, self.reg(a).count_ones() as u64)
            }

            CountSetBits32 => {
                let (d, a) = args::two_regs(ops);
                self.alu_64(d, self.reg32(a).count_ones() as u64)
            }

            LeadingZeroBits64 => {
                let (d, a) = args::two_regs(ops);
                self.alu_64(d, self.reg(a).leading_zeros() as u64)
            }

            LeadingZeroBits32 => {
                let (d, a) = args::two_regs(ops);
                self.alu_64(d, self.reg32(a).leading_zeros() as u64)
            }

            TrailingZeroBits64 => {
                let (d, a) = args::two_regs(ops);
                self.alu_64(d, self.reg(a).trailing_zeros() as u64)
            }

            TrailingZeroBits32 => {
                let (d, a) = args::two_regs(ops);
                self.alu_64(d, self.reg32(a).trailing_zeros() as u64)
            }

            SignExtend8 => {
                let (d, a) = args::two_regs(ops);
                self.alu_64(d, sext(self.reg(a), 1))
            }

            SignExtend16 => {
                let (d, a) = args::two_regs(ops);
                self.alu_64(d, sext(self.reg(a), 2))
            }

            ZeroExtend16 => {
                let (d, a) = args::two_regs(ops);
                self.alu_64(d, self.reg(a) & 0xffff)
            }

            ReverseBytes => {
                let (d, a) = args::two_regs(ops);
                self.alu_64(d, self.reg(a).swap_bytes())
            }

            StoreIndU8 | StoreIndU16 | StoreIndU32 | StoreIndU64 => {
                let (a, b, imm) = args::two_regs_imm(ops);
                self.store(effective(self.reg(b), imm), self.reg(a), store_width(op))
            }

            LoadIndU8 | LoadIndI8 | LoadIndU16 | LoadIndI16 | LoadIndU32 | LoadIndI32
            | LoadIndU64 => {
                let (a, b, imm) = args::two_regs_imm(ops);
                self.load(a, effective(self.reg(b), imm), load_width(op), load_signed(op))
            }

            AddImm32 => {
                let (a, b, imm) = args::two_regs_imm(ops);
                self.alu_32(a, self.reg32(b).wrapping_add(imm as u32))
            }

            AndImm => {
                let (a, b, imm) = args::two_regs_imm(ops);
                self.alu_64(a, self.reg(b) & imm)
            }

            XorImm => {
                let (a, b, imm) = args::two_regs_imm(ops);
                self.alu_64(a, self.reg(b) ^ imm)
            }

            OrImm => {
                let (a, b, imm) = args::two_regs_imm(ops);
                self.alu_64(a, self.reg(b) | imm)
            }

            MulImm32 => {
                let (a, b, imm) = args::two_regs_imm(ops);
                self.alu_32(a, self.reg32(b).wrapping_mul(imm as u32))
            }

            SetLtUImm => {
                let (a, b, imm) = args::two_regs_imm(ops);
                self.alu_64(a, (self.reg(b) < imm) as u64)
            }

            SetLtSImm => {
                let (a, b, imm) = args::two_regs_imm(ops);
                self.alu_64(a, ((self.reg(b) as i64) < imm as i64) as u64)
            }

            ShloLImm32 => {
                let (a, b, imm) = args::two_regs_imm(ops);
                self.alu_32(a, self.reg32(b).wrapping_shl(imm as u32))
            }

            ShloRImm32 => {
                let (a, b, imm) = args::two_regs_imm(ops);
                self.alu_32(a, self.reg32(b).wrapping_shr(imm as u32))
            }

            SharRImm32 => {
                let (a, b, imm) = args::two_regs_imm(ops);
                self.alu_32(a, (self.reg32(b) as i32).wrapping_shr(imm as u32) as u32)
            }

            NegAddImm32 => {
                let (a, b, imm) = args::two_regs_imm(ops);
                self.alu_32(a, (imm as u32).wrapping_sub(self.reg32(b)))
            }

            SetGtUImm => {
                let (a, b, imm) = args::two_regs_imm(ops);
                self.alu_64(a, (self.reg(b) > imm) as u64)
            }

            SetGtSImm => {
                let (a, b, imm) = args::two_regs_imm(ops);
                self.alu_64(a, (self.reg(b) as i64 > imm as i64) as u64)
            }

            ShloLImmAlt32 => {
                let (a, b, imm) = args::two_regs_imm(ops);
                self.alu_32(a, (imm as u32).wrapping_shl(self.reg(b) as u32))
            }

            ShloRImmAlt32 => {
                let (a, b, imm) = args::two_regs_imm(ops);
                self.alu_32(a, (imm as u32).wrapping_shr(self.reg(b) as u32))
            }

            SharRImmAlt32 => {
                let (a, b, imm) = args::two_regs_imm(ops);
                self.alu_32(a, (imm as i32).wrapping_shr(self.reg(b) as u32) as u32)
            }

            CmovIzImm => {
                let (a, b, imm) = args::two_regs_imm(ops);
                let value = if self.reg(b) == 0 { imm } else { self.reg(a) };
                self.alu_64(a, value)
            }

            CmovNzImm => {
                let (a, b, imm) = args::two_regs_imm(ops);
                let value = if self.reg(b) != 0 { imm } else { self.reg(a) };
                self.alu_64(a, value)
            }

            AddImm64 => {
                let (a, b, imm) = args::two_regs_imm(ops);
                self.alu_64(a, self.reg(b).wrapping_add(imm))
            }

            MulImm64 => {
                let (a, b, imm) = args::two_regs_imm(ops);
                self.alu_64(a, self.reg(b).wrapping_mul(imm))
            }

            ShloLImm64 => {
                let (a, b, imm) = args::two_regs_imm(ops);
                self.alu_64(a, self.reg(b).wrapping_shl(imm as u32))
            }

            ShloRImm64 => {
                let (a, b, imm) = args::two_regs_imm(ops);
                self.alu_64(a, self.reg(b).wrapping_shr(imm as u32))
            }

            SharRImm64 => {
                let (a, b, imm) = args::two_regs_imm(ops);
                self.alu_64(a, (self.reg(b) as i64).wrapping_shr(imm as u32) as u64)
            }

            NegAddImm64 => {
                let (a, b, imm) = args::two_regs_imm(ops);
                self.alu_64(a, imm.wrapping_sub(self.reg(b)))
            }

            ShloLImmAlt64 => {
                let (a, b, imm) = args::two_regs_imm(ops);
                self.alu_64(a, imm.wrapping_shl(self.reg(b) as u32))
            }

            ShloRImmAlt64 => {
                let (a, b, imm) = args::two_regs_imm(ops);
                self.alu_64(a, imm.wrapping_shr(self.reg(b) as u32))
            }

            SharRImmAlt64 => {
                let (a, b, imm) = args::two_regs_imm(ops);
                self.alu_64(a, (imm as i64).wrapping_shr(self.reg(b) as u32) as u64)
            }

            RotR64Imm => {
                let (a, b, imm) = args::two_regs_imm(ops);
                self.alu_64(a, self.reg(b).rotate_right(imm as u32))
            }

            RotR64ImmAlt => {
                let (a, b, imm) = args::two_regs_imm(ops);
                self.alu_64(a, imm.rotate_right(self.reg(b) as u32))
            }

            RotR32Imm => {
                let (a, b, imm) = args::two_regs_imm(ops);
                self.alu_32(a, self.reg32(b).rotate_right(imm as u32))
            }

            RotR32ImmAlt => {
                let (a, b, imm) = args::two_regs_imm(ops);
                self.alu_32(a, (imm as u32).rotate_right(self.reg(b) as u32))
            }

            BranchEq | BranchNe | BranchLtU | BranchLtS | BranchGeU | BranchGeS => {
                let (a, b, offset) = args::two_regs_offset(ops);
                let (lhs, rhs) = (self.reg(a), self.reg(b));
                let taken = match op {
                    BranchEq => lhs == rhs,
                    BranchNe => lhs != rhs,
                    BranchLtU => lhs < rhs,
                    BranchLtS => (lhs as i64) < rhs as i64,
                    BranchGeU => lhs >= rhs,
                    _ => lhs as i64 >= rhs as i64,
                };
                self.branch(offset, taken)
            }

            LoadImmJumpInd => {
                let (a, b, x, y) = args::two_regs_two_imms(ops);
                let address = effective(self.reg(b), y);
                self.write_reg(a, x);
                self.jump_dynamic(address as u64)
            }

            Add32 => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_32(d, self.reg32(a).wrapping_add(self.reg32(b)))
            }

            Sub32 => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_32(d, self.reg32(a).wrapping_sub(self.reg32(b)))
            }

            Mul32 => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_32(d, self.reg32(a).wrapping_mul(self.reg32(b)))
            }

            DivU32 => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_32(d, muldiv::div_u_32(self.reg32(a), self.reg32(b)))
            }

            DivS32 => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_32(d, muldiv::div_s_32(self.reg32(a), self.reg32(b)))
            }

            RemU32 => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_32(d, muldiv::rem_u_32(self.reg32(a), self.reg32(b)))
            }

            RemS32 => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_32(d, muldiv::rem_s_32(self.reg32(a), self.reg32(b)))
            }

            ShloL32 => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_32(d, self.reg32(a).wrapping_shl(self.reg(b) as u32))
            }

            ShloR32 => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_32(d, self.reg32(a).wrapping_shr(self.reg(b) as u32))
            }

            SharR32 => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_32(d, (self.reg32(a) as i32).wrapping_shr(self.reg(b) as u32) as u32)
            }

            Add64 => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_64(d, self.reg(a).wrapping_add(self.reg(b)))
            }

            Sub64 => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_64(d, self.reg(a).wrapping_sub(self.reg(b)))
            }

            Mul64 => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_64(d, self.reg(a).wrapping_mul(self.reg(b)))
            }

            DivU64 => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_64(d, muldiv::div_u_64(self.reg(a), self.reg(b)))
            }

            DivS64 => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_64(d, muldiv::div_s_64(self.reg(a), self.reg(b)))
            }

            RemU64 => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_64(d, muldiv::rem_u_64(self.reg(a), self.reg(b)))
            }

            RemS64 => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_64(d, muldiv::rem_s_64(self.reg(a), self.reg(b)))
            }

            ShloL64 => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_64(d, self.reg(a).wrapping_shl(self.reg(b) as u32))
            }

            ShloR64 => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_64(d, self.reg(a).wrapping_shr(self.reg(b) as u32))
            }

            SharR64 => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_64(d, (self.reg(a) as i64).wrapping_shr(self.reg(b) as u32) as u64)
            }

            And => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_64(d, self.reg(a) & self.reg(b))
            }

            Xor => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_64(d, self.reg(a) ^ self.reg(b))
            }

            Or => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_64(d, self.reg(a) | self.reg(b))
            }

            MulUpperSS => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_64(d, muldiv::mul_upper_s_s(self.reg(a), self.reg(b)))
            }

            MulUpperUU => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_64(d, muldiv::mul_upper_u_u(self.reg(a), self.reg(b)))
            }

            MulUpperSU => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_64(d, muldiv::mul_upper_s_u(self.reg(a), self.reg(b)))
            }

            SetLtU => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_64(d, (self.reg(a) < self.reg(b)) as u64)
            }

            SetLtS => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_64(d, ((self.reg(a) as i64) < self.reg(b) as i64) as u64)
            }

            CmovIz => {
                let (a, b, d) = args::three_regs(ops);
                let value = if self.reg(b) == 0 { self.reg(a) } else { self.reg(d) };
                self.alu_64(d, value)
            }

            CmovNz => {
                let (a, b, d) = args::three_regs(ops);
                let value = if self.reg(b) != 0 { self.reg(a) } else { self.reg(d) };
                self.alu_64(d, value)
            }

            RotL64 => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_64(d, self.reg(a).rotate_left(self.reg(b) as u32))
            }

            RotL32 => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_32(d, self.reg32(a).rotate_left(self.reg(b) as u32))
            }

            RotR64 => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_64(d, self.reg(a).rotate_right(self.reg(b) as u32))
            }

            RotR32 => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_32(d, self.reg32(a).rotate_right(self.reg(b) as u32))
            }

            AndInv => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_64(d, self.reg(a) & !self.reg(b))
            }

            OrInv => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_64(d, self.reg(a) | !self.reg(b))
            }

            Xnor => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_64(d, !(self.reg(a) ^ self.reg(b)))
            }

            Max => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_64(d, (self.reg(a) as i64).max(self.reg(b) as i64) as u64)
            }

            MaxU => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_64(d, self.reg(a).max(self.reg(b)))
            }

            Min => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_64(d, (self.reg(a) as i64).min(self.reg(b) as i64) as u64)
            }

            MinU => {
                let (a, b, d) = args::three_regs(ops);
                self.alu_64(d, self.reg(a).min(self.reg(b)))
            }
        }
    }
}

const fn load_width(op: Opcode) -> usize {
    use Opcode::*;

    match op {
        LoadU8 | LoadI8 | LoadIndU8 | LoadIndI8 => 1,
        LoadU16 | LoadI16 | LoadIndU16 | LoadIndI16 => 2,
        LoadU32 | LoadI32 | LoadIndU32 | LoadIndI32 => 4,
        _ => 8,
    }
}

const fn load_signed(op: Opcode) -> bool {
    use Opcode::*;

    matches!(op, LoadI8 | LoadI16 | LoadI32 | LoadIndI8 | LoadIndI16 | LoadIndI32)
}

const fn store_width(op: Opcode) -> usize {
    use Opcode::*;

    match op {
        StoreImmU8 | StoreU8 | StoreImmIndU8 | StoreIndU8 => 1,
        StoreImmU16 | StoreU16 | StoreImmIndU16 | StoreIndU16 => 2,
        StoreImmU32 | StoreU32 | StoreImmIndU32 | StoreIndU32 => 4,
        _ => 8,
    }
}
