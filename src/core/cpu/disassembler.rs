// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! MIPS instruction disassembler for debugging
//!
//! Renders a decoded [`Instruction`] as assembly text. Registers are shown
//! as `rN`, branch and jump targets as absolute addresses.

use super::decode::{decode, ImmediateOp, Instruction, JumpOp, RegisterOp};

/// Instruction disassembler
///
/// # Example
/// ```
/// use cw33300::core::cpu::Disassembler;
///
/// let disasm = Disassembler::disassemble(0x00000000, 0xBFC00000);
/// assert_eq!(disasm, "nop");
///
/// let disasm = Disassembler::disassemble(0x3C011234, 0xBFC00000);
/// assert_eq!(disasm, "lui r1, 0x1234");
/// ```
pub struct Disassembler;

impl Disassembler {
    /// Disassemble a single instruction word
    ///
    /// # Arguments
    ///
    /// * `instruction` - The 32-bit instruction to disassemble
    /// * `pc` - Address of the instruction (for branch/jump targets)
    pub fn disassemble(instruction: u32, pc: u32) -> String {
        if instruction == 0 {
            return "nop".to_string();
        }

        match decode(instruction) {
            Instruction::Register {
                op,
                rs,
                rt,
                rd,
                shamt,
            } => Self::disasm_register(instruction, op, rs, rt, rd, shamt),
            Instruction::Immediate { op, rs, rt, imm } => {
                Self::disasm_immediate(instruction, op, rs, rt, imm, pc)
            }
            Instruction::Jump { op, target } => {
                let addr = (pc.wrapping_add(4) & 0xF000_0000) | (target << 2);
                match op {
                    JumpOp::J => format!("j 0x{:08X}", addr),
                    JumpOp::Jal => format!("jal 0x{:08X}", addr),
                }
            }
            Instruction::Reserved(word) => format!("??? 0x{:08X}", word),
        }
    }

    fn disasm_register(word: u32, op: RegisterOp, rs: u8, rt: u8, rd: u8, shamt: u8) -> String {
        use RegisterOp::*;

        let name = format!("{:?}", op).to_lowercase();

        match op {
            Sll | Srl | Sra => format!("{} r{}, r{}, {}", name, rd, rt, shamt),
            Sllv | Srlv | Srav => format!("{} r{}, r{}, r{}", name, rd, rt, rs),
            Jr => format!("jr r{}", rs),
            Jalr => format!("jalr r{}, r{}", rd, rs),
            Syscall | Break => format!("{} 0x{:05X}", name, (word >> 6) & 0xF_FFFF),
            Mfhi | Mflo => format!("{} r{}", name, rd),
            Mthi | Mtlo => format!("{} r{}", name, rs),
            Mult | Multu | Div | Divu => format!("{} r{}, r{}", name, rs, rt),
            Add | Addu | Sub | Subu | And | Or | Xor | Nor | Slt | Sltu => {
                format!("{} r{}, r{}, r{}", name, rd, rs, rt)
            }
        }
    }

    fn disasm_immediate(word: u32, op: ImmediateOp, rs: u8, rt: u8, imm: u16, pc: u32) -> String {
        use ImmediateOp::*;

        let simm = imm as i16;
        let target = pc
            .wrapping_add(4)
            .wrapping_add((simm as i32 as u32) << 2);
        let cop_reg = (imm >> 11) & 0x1F;

        match op {
            Bltz => format!("bltz r{}, 0x{:08X}", rs, target),
            Bgez => format!("bgez r{}, 0x{:08X}", rs, target),
            Bltzal => format!("bltzal r{}, 0x{:08X}", rs, target),
            Bgezal => format!("bgezal r{}, 0x{:08X}", rs, target),
            Beq => format!("beq r{}, r{}, 0x{:08X}", rs, rt, target),
            Bne => format!("bne r{}, r{}, 0x{:08X}", rs, rt, target),
            Blez => format!("blez r{}, 0x{:08X}", rs, target),
            Bgtz => format!("bgtz r{}, 0x{:08X}", rs, target),
            Addi => format!("addi r{}, r{}, {}", rt, rs, simm),
            Addiu => format!("addiu r{}, r{}, {}", rt, rs, simm),
            Slti => format!("slti r{}, r{}, {}", rt, rs, simm),
            Sltiu => format!("sltiu r{}, r{}, {}", rt, rs, simm),
            Andi => format!("andi r{}, r{}, 0x{:04X}", rt, rs, imm),
            Ori => format!("ori r{}, r{}, 0x{:04X}", rt, rs, imm),
            Xori => format!("xori r{}, r{}, 0x{:04X}", rt, rs, imm),
            Lui => format!("lui r{}, 0x{:04X}", rt, imm),
            Lb | Lh | Lwl | Lw | Lbu | Lhu | Lwr | Sb | Sh | Swl | Sw | Swr => {
                let name = format!("{:?}", op).to_lowercase();
                format!("{} r{}, {}(r{})", name, rt, simm, rs)
            }
            Mfc0 => format!("mfc0 r{}, cop0r{}", rt, cop_reg),
            Cfc0 => format!("cfc0 r{}, cop0r{}", rt, cop_reg),
            Mtc0 => format!("mtc0 r{}, cop0r{}", rt, cop_reg),
            Ctc0 => format!("ctc0 r{}, cop0r{}", rt, cop_reg),
            Bc0f => format!("bc0f 0x{:08X}", target),
            Bc0t => format!("bc0t 0x{:08X}", target),
            Rfe => "rfe".to_string(),
            Cop0Command => format!("cop0 0x{:07X}", word & 0x01FF_FFFF),
            Lwc0 => format!("lwc0 cop0r{}, {}(r{})", rt, simm, rs),
            Swc0 => format!("swc0 cop0r{}, {}(r{})", rt, simm, rs),
            Cop(n) => format!("cop{} 0x{:07X}", n, word & 0x03FF_FFFF),
            Lwc(n) => format!("lwc{} r{}, {}(r{})", n, rt, simm, rs),
            Swc(n) => format!("swc{} r{}, {}(r{})", n, rt, simm, rs),
        }
    }
}
