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

use super::super::registers::REG_RA;
use super::super::CPU;
use super::sign_extend;
use crate::core::error::Result;

impl CPU {
    // === Branch Instructions ===
    //
    // While an instruction executes, PC already holds the delay slot address
    // (B + 4). Branch targets are relative to it. Taken branches only latch
    // the target; the delay slot runs before control transfers.

    /// BLTZ: Branch on Less Than Zero
    ///
    /// Format: bltz rs, offset
    pub(in crate::core::cpu) fn op_bltz(&mut self, rs: u8, imm: u16) -> Result<()> {
        if (self.reg(rs) as i32) < 0 {
            self.branch(imm);
        }
        Ok(())
    }

    /// BGEZ: Branch on Greater Than or Equal to Zero
    ///
    /// Format: bgez rs, offset
    pub(in crate::core::cpu) fn op_bgez(&mut self, rs: u8, imm: u16) -> Result<()> {
        if (self.reg(rs) as i32) >= 0 {
            self.branch(imm);
        }
        Ok(())
    }

    /// BLTZAL: Branch on Less Than Zero And Link
    ///
    /// $ra receives the return address whether or not the branch is taken.
    /// The comparison uses rs as it was before the link write.
    ///
    /// Format: bltzal rs, offset
    pub(in crate::core::cpu) fn op_bltzal(&mut self, rs: u8, imm: u16) -> Result<()> {
        let taken = (self.reg(rs) as i32) < 0;
        self.link(REG_RA);
        if taken {
            self.branch(imm);
        }
        Ok(())
    }

    /// BGEZAL: Branch on Greater Than or Equal to Zero And Link
    ///
    /// Format: bgezal rs, offset
    pub(in crate::core::cpu) fn op_bgezal(&mut self, rs: u8, imm: u16) -> Result<()> {
        let taken = (self.reg(rs) as i32) >= 0;
        self.link(REG_RA);
        if taken {
            self.branch(imm);
        }
        Ok(())
    }

    /// BEQ: Branch on Equal
    ///
    /// Format: beq rs, rt, offset
    /// Operation: if (rs == rt) branch
    pub(in crate::core::cpu) fn op_beq(&mut self, rs: u8, rt: u8, imm: u16) -> Result<()> {
        if self.reg(rs) == self.reg(rt) {
            self.branch(imm);
        }
        Ok(())
    }

    /// BNE: Branch on Not Equal
    ///
    /// Format: bne rs, rt, offset
    /// Operation: if (rs != rt) branch
    pub(in crate::core::cpu) fn op_bne(&mut self, rs: u8, rt: u8, imm: u16) -> Result<()> {
        if self.reg(rs) != self.reg(rt) {
            self.branch(imm);
        }
        Ok(())
    }

    /// BLEZ: Branch on Less Than or Equal to Zero
    ///
    /// Format: blez rs, offset
    pub(in crate::core::cpu) fn op_blez(&mut self, rs: u8, imm: u16) -> Result<()> {
        if (self.reg(rs) as i32) <= 0 {
            self.branch(imm);
        }
        Ok(())
    }

    /// BGTZ: Branch on Greater Than Zero
    ///
    /// Format: bgtz rs, offset
    pub(in crate::core::cpu) fn op_bgtz(&mut self, rs: u8, imm: u16) -> Result<()> {
        if (self.reg(rs) as i32) > 0 {
            self.branch(imm);
        }
        Ok(())
    }

    /// Latch a PC-relative branch: target = (B + 4) + (sign_extend(imm) << 2)
    pub(in crate::core::cpu) fn branch(&mut self, imm: u16) {
        let offset = sign_extend(imm) << 2;
        let target = self.regs.pc().wrapping_add(offset);
        self.regs.store_delayed_jump(target);
    }

    /// Write the return address (B + 8, past the delay slot) into `reg`
    pub(in crate::core::cpu) fn link(&mut self, reg: u8) {
        let return_address = self.regs.pc().wrapping_add(4);
        self.set_reg(reg, return_address);
    }
}
