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

use super::super::CPU;
use crate::core::error::Result;

impl CPU {
    // === Shift Instructions ===

    /// SLL: Shift Left Logical
    ///
    /// SLL with all fields zero is the canonical NOP.
    ///
    /// Format: sll rd, rt, shamt
    /// Operation: rd = rt << shamt
    pub(in crate::core::cpu) fn op_sll(&mut self, rt: u8, rd: u8, shamt: u8) -> Result<()> {
        self.set_reg(rd, self.reg(rt) << (shamt & 0x1F));
        Ok(())
    }

    /// SRL: Shift Right Logical (zero-fill)
    ///
    /// Format: srl rd, rt, shamt
    /// Operation: rd = rt >> shamt
    pub(in crate::core::cpu) fn op_srl(&mut self, rt: u8, rd: u8, shamt: u8) -> Result<()> {
        self.set_reg(rd, self.reg(rt) >> (shamt & 0x1F));
        Ok(())
    }

    /// SRA: Shift Right Arithmetic (sign-fill)
    ///
    /// Format: sra rd, rt, shamt
    /// Operation: rd = (rt as i32) >> shamt
    pub(in crate::core::cpu) fn op_sra(&mut self, rt: u8, rd: u8, shamt: u8) -> Result<()> {
        let value = (self.reg(rt) as i32) >> (shamt & 0x1F);
        self.set_reg(rd, value as u32);
        Ok(())
    }

    /// SLLV: Shift Left Logical Variable
    ///
    /// Only the low 5 bits of rs are used as the shift amount.
    ///
    /// Format: sllv rd, rt, rs
    pub(in crate::core::cpu) fn op_sllv(&mut self, rs: u8, rt: u8, rd: u8) -> Result<()> {
        let shift = self.reg(rs) & 0x1F;
        self.set_reg(rd, self.reg(rt) << shift);
        Ok(())
    }

    /// SRLV: Shift Right Logical Variable
    ///
    /// Format: srlv rd, rt, rs
    pub(in crate::core::cpu) fn op_srlv(&mut self, rs: u8, rt: u8, rd: u8) -> Result<()> {
        let shift = self.reg(rs) & 0x1F;
        self.set_reg(rd, self.reg(rt) >> shift);
        Ok(())
    }

    /// SRAV: Shift Right Arithmetic Variable
    ///
    /// Format: srav rd, rt, rs
    pub(in crate::core::cpu) fn op_srav(&mut self, rs: u8, rt: u8, rd: u8) -> Result<()> {
        let shift = self.reg(rs) & 0x1F;
        let value = (self.reg(rt) as i32) >> shift;
        self.set_reg(rd, value as u32);
        Ok(())
    }
}
