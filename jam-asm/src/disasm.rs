//! Human-readable instruction rendering, for traces and tooling.

use crate::args;
use crate::conv::signed;
use crate::opcode::OperandsFormat;
use crate::program::Program;

/// Render the instruction at `pc` as `mnemonic operand, ...`.
///
/// Registers print as `rN`, immediates in their signed reading, the
/// extended immediate of `load_imm_64` in hex. Unknown opcode bytes render
/// as `invalid (0x..)`.
pub fn instruction(program: &Program, pc: u64) -> String {
    let Some(opcode) = program.opcode_at(pc) else {
        let byte = program.code().get(pc as usize).copied().unwrap_or(0);
        return format!("invalid ({byte:#04x})");
    };

    let ops = program.operands(pc);
    let name = opcode.mnemonic();
    match opcode.operands() {
        OperandsFormat::NoArgs => name.to_string(),
        OperandsFormat::OneImm => format!("{name} {}", args::one_imm(ops)),
        OperandsFormat::RegExtImm => {
            let (a, value) = args::reg_ext_imm(ops);
            format!("{name} r{}, {value:#x}", a.to_u8())
        }
        OperandsFormat::TwoImms => {
            let (x, y) = args::two_imms(ops);
            format!("{name} {}, {}", signed(x), signed(y))
        }
        OperandsFormat::OneOffset => format!("{name} {}", args::one_offset(ops)),
        OperandsFormat::RegImm => {
            let (a, value) = args::reg_imm(ops);
            format!("{name} r{}, {}", a.to_u8(), signed(value))
        }
        OperandsFormat::RegTwoImms => {
            let (a, x, y) = args::reg_two_imms(ops);
            format!("{name} r{}, {}, {}", a.to_u8(), signed(x), signed(y))
        }
        OperandsFormat::RegImmOffset => {
            let (a, x, offset) = args::reg_imm_offset(ops);
            format!("{name} r{}, {}, {offset}", a.to_u8(), signed(x))
        }
        OperandsFormat::TwoRegs => {
            let (d, a) = args::two_regs(ops);
            format!("{name} r{}, r{}", d.to_u8(), a.to_u8())
        }
        OperandsFormat::TwoRegsImm => {
            let (a, b, value) = args::two_regs_imm(ops);
            format!("{name} r{}, r{}, {}", a.to_u8(), b.to_u8(), signed(value))
        }
        OperandsFormat::TwoRegsOffset => {
            let (a, b, offset) = args::two_regs_offset(ops);
            format!("{name} r{}, r{}, {offset}", a.to_u8(), b.to_u8())
        }
        OperandsFormat::TwoRegsTwoImms => {
            let (a, b, x, y) = args::two_regs_two_imms(ops);
            format!(
                "{name} r{}, r{}, {}, {}",
                a.to_u8(),
                b.to_u8(),
                signed(x),
                signed(y)
            )
        }
        OperandsFormat::ThreeRegs => {
            let (a, b, d) = args::three_regs(ops);
            format!("{name} r{}, r{}, r{}", a.to_u8(), b.to_u8(), d.to_u8())
        }
    }
}

impl Program {
    /// One rendered line per bitmask boundary of the real code.
    pub fn disassemble(&self) -> Vec<(u64, String)> {
        (0..self.code_len() as u64)
            .filter(|&pc| self.is_opcode_boundary(pc))
            .map(|pc| (pc, instruction(self, pc)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::{self, ProgramBuilder};
    use crate::RegId;

    #[test]
    fn renders_the_common_formats() {
        let r = RegId::new;
        let mut builder = ProgramBuilder::new();
        builder.push(&op::add_32(r(1), r(2), r(3)));
        builder.push(&op::load_imm(r(7), -5i64 as u64));
        builder.push(&op::ecalli(9));
        builder.push(&op::load_imm_64(r(4), 0xdead));
        builder.push(&op::branch_eq_imm(r(1), 7, -4));
        builder.push(&op::trap());

        let listing = builder.program().disassemble();
        let lines: Vec<&str> = listing.iter().map(|(_, line)| line.as_str()).collect();
        assert_eq!(
            lines,
            [
                "add_32 r1, r2, r3",
                "load_imm r7, -5",
                "ecalli 9",
                "load_imm_64 r4, 0xdead",
                "branch_eq_imm r1, 7, -4",
                "trap",
            ]
        );
        assert_eq!(listing[2].0, 6);
    }

    #[test]
    fn unknown_bytes_render_as_invalid() {
        let program = crate::Program::new(vec![99], vec![true], vec![]).unwrap();
        assert_eq!(instruction(&program, 0), "invalid (0x63)");
    }
}
