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
use crate::core::error::Result;

impl CPU {
    // === Jump Instructions ===

    /// J: Jump
    ///
    /// Format: j target
    /// Operation: PC = (PC & 0xF0000000) | (target << 2), after the delay slot
    ///
    /// # Arguments
    ///
    /// * `target` - 26-bit word index within the current 256MB segment
    pub(crate) fn op_j(&mut self, target: u32) -> Result<()> {
        let pc_high = self.regs.pc() & 0xF000_0000;
        self.regs.store_delayed_jump(pc_high | (target << 2));
        Ok(())
    }

    /// JAL: Jump And Link
    ///
    /// Format: jal target
    /// Operation: $ra = PC + 8; PC = (PC & 0xF0000000) | (target << 2)
    pub(crate) fn op_jal(&mut self, target: u32) -> Result<()> {
        self.link(REG_RA);
        self.op_j(target)
    }

    /// JR: Jump Register
    ///
    /// A misaligned target is not checked here: the fetch at the target
    /// raises the address error.
    ///
    /// Format: jr rs
    pub(crate) fn op_jr(&mut self, rs: u8) -> Result<()> {
        let target = self.reg(rs);
        self.regs.store_delayed_jump(target);
        Ok(())
    }

    /// JALR: Jump And Link Register
    ///
    /// The target is read before rd is written, so `jalr rX, rX` jumps to
    /// the old value.
    ///
    /// Format: jalr rd, rs
    pub(crate) fn op_jalr(&mut self, rs: u8, rd: u8) -> Result<()> {
        let target = self.reg(rs);
        self.link(rd);
        self.regs.store_delayed_jump(target);
        Ok(())
    }
}
