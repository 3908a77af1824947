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

//! CPU instruction implementations
//!
//! [`CPU::execute`] is the single dispatcher over a decoded
//! [`Instruction`]. Semantics are split into one file per instruction
//! group.

use super::decode::{ImmediateOp, Instruction, JumpOp, RegisterOp};
use super::{ExceptionCause, CPU};
use crate::core::error::Result;
use crate::core::memory::Bus;

// Instruction modules organized by type
mod arithmetic;
mod branch;
mod cop0;
mod coprocessor;
mod exception;
mod jump;
mod load;
mod logical;
mod multiply;
mod shift;
mod store;

/// Sign-extend a 16-bit immediate
#[inline(always)]
pub(super) fn sign_extend(imm: u16) -> u32 {
    imm as i16 as i32 as u32
}

impl CPU {
    /// Execute a decoded instruction
    ///
    /// # Arguments
    ///
    /// * `instruction` - Output of [`decode`](super::decode)
    /// * `bus` - Memory bus for loads and stores
    ///
    /// # Returns
    ///
    /// Ok(()) on success; emulated faults are raised as exceptions
    pub(super) fn execute(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<()> {
        match instruction {
            Instruction::Register {
                op,
                rs,
                rt,
                rd,
                shamt,
            } => self.execute_register(op, rs, rt, rd, shamt),
            Instruction::Immediate { op, rs, rt, imm } => {
                self.execute_immediate(op, rs, rt, imm, bus)
            }
            Instruction::Jump { op, target } => match op {
                JumpOp::J => self.op_j(target),
                JumpOp::Jal => self.op_jal(target),
            },
            Instruction::Reserved(word) => self.op_reserved(word),
        }
    }

    fn execute_register(&mut self, op: RegisterOp, rs: u8, rt: u8, rd: u8, shamt: u8) -> Result<()> {
        match op {
            RegisterOp::Sll => self.op_sll(rt, rd, shamt),
            RegisterOp::Srl => self.op_srl(rt, rd, shamt),
            RegisterOp::Sra => self.op_sra(rt, rd, shamt),
            RegisterOp::Sllv => self.op_sllv(rs, rt, rd),
            RegisterOp::Srlv => self.op_srlv(rs, rt, rd),
            RegisterOp::Srav => self.op_srav(rs, rt, rd),
            RegisterOp::Jr => self.op_jr(rs),
            RegisterOp::Jalr => self.op_jalr(rs, rd),
            RegisterOp::Syscall => self.op_syscall(),
            RegisterOp::Break => self.op_break(),
            RegisterOp::Mfhi => self.op_mfhi(rd),
            RegisterOp::Mthi => self.op_mthi(rs),
            RegisterOp::Mflo => self.op_mflo(rd),
            RegisterOp::Mtlo => self.op_mtlo(rs),
            RegisterOp::Mult => self.op_mult(rs, rt),
            RegisterOp::Multu => self.op_multu(rs, rt),
            RegisterOp::Div => self.op_div(rs, rt),
            RegisterOp::Divu => self.op_divu(rs, rt),
            RegisterOp::Add => self.op_add(rs, rt, rd),
            RegisterOp::Addu => self.op_addu(rs, rt, rd),
            RegisterOp::Sub => self.op_sub(rs, rt, rd),
            RegisterOp::Subu => self.op_subu(rs, rt, rd),
            RegisterOp::And => self.op_and(rs, rt, rd),
            RegisterOp::Or => self.op_or(rs, rt, rd),
            RegisterOp::Xor => self.op_xor(rs, rt, rd),
            RegisterOp::Nor => self.op_nor(rs, rt, rd),
            RegisterOp::Slt => self.op_slt(rs, rt, rd),
            RegisterOp::Sltu => self.op_sltu(rs, rt, rd),
        }
    }

    fn execute_immediate(
        &mut self,
        op: ImmediateOp,
        rs: u8,
        rt: u8,
        imm: u16,
        bus: &mut Bus,
    ) -> Result<()> {
        match op {
            ImmediateOp::Bltz => self.op_bltz(rs, imm),
            ImmediateOp::Bgez => self.op_bgez(rs, imm),
            ImmediateOp::Bltzal => self.op_bltzal(rs, imm),
            ImmediateOp::Bgezal => self.op_bgezal(rs, imm),
            ImmediateOp::Beq => self.op_beq(rs, rt, imm),
            ImmediateOp::Bne => self.op_bne(rs, rt, imm),
            ImmediateOp::Blez => self.op_blez(rs, imm),
            ImmediateOp::Bgtz => self.op_bgtz(rs, imm),
            ImmediateOp::Addi => self.op_addi(rs, rt, imm),
            ImmediateOp::Addiu => self.op_addiu(rs, rt, imm),
            ImmediateOp::Slti => self.op_slti(rs, rt, imm),
            ImmediateOp::Sltiu => self.op_sltiu(rs, rt, imm),
            ImmediateOp::Andi => self.op_andi(rs, rt, imm),
            ImmediateOp::Ori => self.op_ori(rs, rt, imm),
            ImmediateOp::Xori => self.op_xori(rs, rt, imm),
            ImmediateOp::Lui => self.op_lui(rt, imm),
            ImmediateOp::Lb => self.op_lb(rs, rt, imm, bus),
            ImmediateOp::Lh => self.op_lh(rs, rt, imm, bus),
            ImmediateOp::Lwl => self.op_lwl(rs, rt, imm, bus),
            ImmediateOp::Lw => self.op_lw(rs, rt, imm, bus),
            ImmediateOp::Lbu => self.op_lbu(rs, rt, imm, bus),
            ImmediateOp::Lhu => self.op_lhu(rs, rt, imm, bus),
            ImmediateOp::Lwr => self.op_lwr(rs, rt, imm, bus),
            ImmediateOp::Sb => self.op_sb(rs, rt, imm, bus),
            ImmediateOp::Sh => self.op_sh(rs, rt, imm, bus),
            ImmediateOp::Swl => self.op_swl(rs, rt, imm, bus),
            ImmediateOp::Sw => self.op_sw(rs, rt, imm, bus),
            ImmediateOp::Swr => self.op_swr(rs, rt, imm, bus),
            ImmediateOp::Mfc0 => self.op_mfc0(rt, imm),
            ImmediateOp::Mtc0 => self.op_mtc0(rt, imm, bus),
            ImmediateOp::Cfc0
            | ImmediateOp::Ctc0
            | ImmediateOp::Bc0f
            | ImmediateOp::Bc0t
            | ImmediateOp::Cop0Command => self.op_cop0_nop(op),
            ImmediateOp::Rfe => self.op_rfe(),
            ImmediateOp::Lwc0 => self.op_lwc0(rs, rt, imm, bus),
            ImmediateOp::Swc0 => self.op_swc0(rs, rt, imm, bus),
            ImmediateOp::Cop(n) => self.op_cop(n),
            ImmediateOp::Lwc(n) | ImmediateOp::Swc(n) => self.op_cop_transfer(n),
        }
    }

    /// Encoding not implemented by this CPU
    ///
    /// Logged and skipped, or raised as ReservedInstruction when
    /// `trap_reserved_instructions` is set.
    fn op_reserved(&mut self, word: u32) -> Result<()> {
        log::warn!(
            "Unimplemented opcode: 0x{:08X} (primary 0x{:02X}) at PC=0x{:08X}",
            word,
            word >> 26,
            self.regs.current_pc()
        );

        if self.trap_reserved_instructions {
            self.exception(ExceptionCause::ReservedInstruction);
        }
        Ok(())
    }
}
