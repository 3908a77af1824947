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

//! Instruction decoder
//!
//! Turns a raw 32-bit word into an [`Instruction`]: one of three operand
//! formats tagged with the concrete operation. Decoding never fails; words
//! this CPU does not implement become [`Instruction::Reserved`].

/// Operations encoded in R-type format (primary opcode 0x00)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOp {
    Sll,
    Srl,
    Sra,
    Sllv,
    Srlv,
    Srav,
    Jr,
    Jalr,
    Syscall,
    Break,
    Mfhi,
    Mthi,
    Mflo,
    Mtlo,
    Mult,
    Multu,
    Div,
    Divu,
    Add,
    Addu,
    Sub,
    Subu,
    And,
    Or,
    Xor,
    Nor,
    Slt,
    Sltu,
}

/// Operations encoded in I-type format
///
/// Coprocessor instructions live here too. For MFC0/MTC0 and friends the
/// COP0 register number sits in the upper bits of `imm` (instruction bits
/// 11-15).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImmediateOp {
    Bltz,
    Bgez,
    Bltzal,
    Bgezal,
    Beq,
    Bne,
    Blez,
    Bgtz,
    Addi,
    Addiu,
    Slti,
    Sltiu,
    Andi,
    Ori,
    Xori,
    Lui,
    Lb,
    Lh,
    Lwl,
    Lw,
    Lbu,
    Lhu,
    Lwr,
    Sb,
    Sh,
    Swl,
    Sw,
    Swr,
    Mfc0,
    Cfc0,
    Mtc0,
    Ctc0,
    Bc0f,
    Bc0t,
    Rfe,
    /// Any other COP0 command (TLB operations on other MIPS parts)
    Cop0Command,
    Lwc0,
    Swc0,
    /// COP1/COP2/COP3 register or command instruction
    Cop(u8),
    /// LWC1/LWC2/LWC3
    Lwc(u8),
    /// SWC1/SWC2/SWC3
    Swc(u8),
}

/// Operations encoded in J-type format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpOp {
    J,
    Jal,
}

/// A decoded instruction bound to its operand fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// | op (6) | rs (5) | rt (5) | rd (5) | shamt (5) | funct (6) |
    Register {
        op: RegisterOp,
        rs: u8,
        rt: u8,
        rd: u8,
        shamt: u8,
    },
    /// | op (6) | rs (5) | rt (5) | immediate (16) |
    Immediate {
        op: ImmediateOp,
        rs: u8,
        rt: u8,
        imm: u16,
    },
    /// | op (6) | target (26) |
    Jump { op: JumpOp, target: u32 },
    /// Encoding not implemented by this CPU
    Reserved(u32),
}

/// Decode R-type instruction
///
/// Format: | op (6) | rs (5) | rt (5) | rd (5) | shamt (5) | funct (6) |
///
/// # Returns
///
/// Tuple of (rs, rt, rd, shamt, funct)
#[inline(always)]
pub(super) fn decode_r_type(instr: u32) -> (u8, u8, u8, u8, u8) {
    let rs = ((instr >> 21) & 0x1F) as u8;
    let rt = ((instr >> 16) & 0x1F) as u8;
    let rd = ((instr >> 11) & 0x1F) as u8;
    let shamt = ((instr >> 6) & 0x1F) as u8;
    let funct = (instr & 0x3F) as u8;
    (rs, rt, rd, shamt, funct)
}

/// Decode I-type instruction
///
/// Format: | op (6) | rs (5) | rt (5) | immediate (16) |
///
/// # Returns
///
/// Tuple of (op, rs, rt, imm)
#[inline(always)]
pub(super) fn decode_i_type(instr: u32) -> (u8, u8, u8, u16) {
    let op = ((instr >> 26) & 0x3F) as u8;
    let rs = ((instr >> 21) & 0x1F) as u8;
    let rt = ((instr >> 16) & 0x1F) as u8;
    let imm = (instr & 0xFFFF) as u16;
    (op, rs, rt, imm)
}

/// Decode J-type instruction
///
/// Format: | op (6) | target (26) |
///
/// # Returns
///
/// Tuple of (op, target)
#[inline(always)]
pub(super) fn decode_j_type(instr: u32) -> (u8, u32) {
    let op = ((instr >> 26) & 0x3F) as u8;
    let target = instr & 0x03FF_FFFF;
    (op, target)
}

/// Decode a 32-bit instruction word
///
/// # Example
///
/// ```
/// use cw33300::core::cpu::{decode, ImmediateOp, Instruction};
///
/// // addiu $t0, $zero, 0x42
/// let instruction = decode(0x2408_0042);
/// assert_eq!(
///     instruction,
///     Instruction::Immediate { op: ImmediateOp::Addiu, rs: 0, rt: 8, imm: 0x42 }
/// );
/// ```
pub fn decode(word: u32) -> Instruction {
    match word >> 26 {
        0x00 => decode_special(word),
        0x02 | 0x03 => {
            let (op, target) = decode_j_type(word);
            let op = if op == 0x02 { JumpOp::J } else { JumpOp::Jal };
            Instruction::Jump { op, target }
        }
        _ => decode_immediate(word),
    }
}

fn decode_special(word: u32) -> Instruction {
    let (rs, rt, rd, shamt, funct) = decode_r_type(word);

    let op = match funct {
        0x00 => RegisterOp::Sll,
        0x02 => RegisterOp::Srl,
        0x03 => RegisterOp::Sra,
        0x04 => RegisterOp::Sllv,
        0x06 => RegisterOp::Srlv,
        0x07 => RegisterOp::Srav,
        0x08 => RegisterOp::Jr,
        0x09 => RegisterOp::Jalr,
        0x0C => RegisterOp::Syscall,
        0x0D => RegisterOp::Break,
        0x10 => RegisterOp::Mfhi,
        0x11 => RegisterOp::Mthi,
        0x12 => RegisterOp::Mflo,
        0x13 => RegisterOp::Mtlo,
        0x18 => RegisterOp::Mult,
        0x19 => RegisterOp::Multu,
        0x1A => RegisterOp::Div,
        0x1B => RegisterOp::Divu,
        0x20 => RegisterOp::Add,
        0x21 => RegisterOp::Addu,
        0x22 => RegisterOp::Sub,
        0x23 => RegisterOp::Subu,
        0x24 => RegisterOp::And,
        0x25 => RegisterOp::Or,
        0x26 => RegisterOp::Xor,
        0x27 => RegisterOp::Nor,
        0x2A => RegisterOp::Slt,
        0x2B => RegisterOp::Sltu,
        _ => return Instruction::Reserved(word),
    };

    Instruction::Register {
        op,
        rs,
        rt,
        rd,
        shamt,
    }
}

fn decode_immediate(word: u32) -> Instruction {
    let (opcode, rs, rt, imm) = decode_i_type(word);

    let op = match opcode {
        0x01 => decode_bcondz(rt),
        0x04 => ImmediateOp::Beq,
        0x05 => ImmediateOp::Bne,
        0x06 => ImmediateOp::Blez,
        0x07 => ImmediateOp::Bgtz,
        0x08 => ImmediateOp::Addi,
        0x09 => ImmediateOp::Addiu,
        0x0A => ImmediateOp::Slti,
        0x0B => ImmediateOp::Sltiu,
        0x0C => ImmediateOp::Andi,
        0x0D => ImmediateOp::Ori,
        0x0E => ImmediateOp::Xori,
        0x0F => ImmediateOp::Lui,
        0x10 => match decode_cop0(word, rs, rt) {
            Some(op) => op,
            None => return Instruction::Reserved(word),
        },
        0x11..=0x13 => ImmediateOp::Cop(opcode - 0x10),
        0x20 => ImmediateOp::Lb,
        0x21 => ImmediateOp::Lh,
        0x22 => ImmediateOp::Lwl,
        0x23 => ImmediateOp::Lw,
        0x24 => ImmediateOp::Lbu,
        0x25 => ImmediateOp::Lhu,
        0x26 => ImmediateOp::Lwr,
        0x28 => ImmediateOp::Sb,
        0x29 => ImmediateOp::Sh,
        0x2A => ImmediateOp::Swl,
        0x2B => ImmediateOp::Sw,
        0x2E => ImmediateOp::Swr,
        0x30 => ImmediateOp::Lwc0,
        0x31..=0x33 => ImmediateOp::Lwc(opcode - 0x30),
        0x38 => ImmediateOp::Swc0,
        0x39..=0x3B => ImmediateOp::Swc(opcode - 0x38),
        _ => return Instruction::Reserved(word),
    };

    Instruction::Immediate { op, rs, rt, imm }
}

/// BcondZ (opcode 0x01): bit 0 of rt selects >= 0, bits 1-4 == 0b1000 link
///
/// Every rt value decodes to one of the four forms, matching hardware.
fn decode_bcondz(rt: u8) -> ImmediateOp {
    let greater_equal = rt & 0x01 != 0;
    let link = rt & 0x1E == 0x10;

    match (greater_equal, link) {
        (false, false) => ImmediateOp::Bltz,
        (true, false) => ImmediateOp::Bgez,
        (false, true) => ImmediateOp::Bltzal,
        (true, true) => ImmediateOp::Bgezal,
    }
}

/// COP0 sub-opcode is in rs (bits 21-25)
fn decode_cop0(word: u32, rs: u8, rt: u8) -> Option<ImmediateOp> {
    let op = match rs {
        0x00 => ImmediateOp::Mfc0,
        0x02 => ImmediateOp::Cfc0,
        0x04 => ImmediateOp::Mtc0,
        0x06 => ImmediateOp::Ctc0,
        0x08 if rt & 0x01 == 0 => ImmediateOp::Bc0f,
        0x08 => ImmediateOp::Bc0t,
        0x10..=0x1F if word & 0x3F == 0x10 => ImmediateOp::Rfe,
        0x10..=0x1F => ImmediateOp::Cop0Command,
        _ => return None,
    };
    Some(op)
}
