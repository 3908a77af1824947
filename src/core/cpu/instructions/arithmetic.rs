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

use super::super::{ExceptionCause, CPU};
use super::sign_extend;
use crate::core::error::Result;

/// Signed overflow of `a + b = result`: operands agree in sign, result differs
#[inline(always)]
fn add_overflows(a: u32, b: u32, result: u32) -> bool {
    (!(a ^ b) & (a ^ result)) & 0x8000_0000 != 0
}

/// Signed overflow of `a - b = result`: operands differ in sign, result
/// differs from the minuend
#[inline(always)]
fn sub_overflows(a: u32, b: u32, result: u32) -> bool {
    ((a ^ b) & (a ^ result)) & 0x8000_0000 != 0
}

impl CPU {
    // === Arithmetic Instructions ===

    /// ADD: Add (with overflow exception)
    ///
    /// Format: add rd, rs, rt
    /// Operation: rd = rs + rt
    ///
    /// On signed overflow rd is left untouched and an Overflow exception is
    /// raised.
    ///
    /// # Arguments
    ///
    /// * `rs` - First source register
    /// * `rt` - Second source register
    /// * `rd` - Destination register
    pub(crate) fn op_add(&mut self, rs: u8, rt: u8, rd: u8) -> Result<()> {
        let a = self.reg(rs);
        let b = self.reg(rt);
        let result = a.wrapping_add(b);

        if add_overflows(a, b, result) {
            self.exception(ExceptionCause::Overflow);
            return Ok(());
        }

        self.set_reg(rd, result);
        Ok(())
    }

    /// ADDU: Add Unsigned (no overflow exception)
    ///
    /// Format: addu rd, rs, rt
    /// Operation: rd = rs + rt (mod 2^32)
    pub(crate) fn op_addu(&mut self, rs: u8, rt: u8, rd: u8) -> Result<()> {
        let result = self.reg(rs).wrapping_add(self.reg(rt));
        self.set_reg(rd, result);
        Ok(())
    }

    /// ADDI: Add Immediate (with overflow exception)
    ///
    /// Format: addi rt, rs, imm
    /// Operation: rt = rs + sign_extend(imm)
    pub(crate) fn op_addi(&mut self, rs: u8, rt: u8, imm: u16) -> Result<()> {
        let a = self.reg(rs);
        let b = sign_extend(imm);
        let result = a.wrapping_add(b);

        if add_overflows(a, b, result) {
            self.exception(ExceptionCause::Overflow);
            return Ok(());
        }

        self.set_reg(rt, result);
        Ok(())
    }

    /// ADDIU: Add Immediate Unsigned (no overflow exception)
    ///
    /// Despite the name the immediate is sign-extended.
    ///
    /// Format: addiu rt, rs, imm
    /// Operation: rt = rs + sign_extend(imm)
    pub(crate) fn op_addiu(&mut self, rs: u8, rt: u8, imm: u16) -> Result<()> {
        let result = self.reg(rs).wrapping_add(sign_extend(imm));
        self.set_reg(rt, result);
        Ok(())
    }

    /// SUB: Subtract (with overflow exception)
    ///
    /// Format: sub rd, rs, rt
    /// Operation: rd = rs - rt
    pub(crate) fn op_sub(&mut self, rs: u8, rt: u8, rd: u8) -> Result<()> {
        let a = self.reg(rs);
        let b = self.reg(rt);
        let result = a.wrapping_sub(b);

        if sub_overflows(a, b, result) {
            self.exception(ExceptionCause::Overflow);
            return Ok(());
        }

        self.set_reg(rd, result);
        Ok(())
    }

    /// SUBU: Subtract Unsigned (no overflow exception)
    ///
    /// Format: subu rd, rs, rt
    /// Operation: rd = rs - rt (mod 2^32)
    pub(crate) fn op_subu(&mut self, rs: u8, rt: u8, rd: u8) -> Result<()> {
        let result = self.reg(rs).wrapping_sub(self.reg(rt));
        self.set_reg(rd, result);
        Ok(())
    }

    /// SLT: Set on Less Than (signed)
    ///
    /// Format: slt rd, rs, rt
    /// Operation: rd = (rs < rt) ? 1 : 0
    pub(crate) fn op_slt(&mut self, rs: u8, rt: u8, rd: u8) -> Result<()> {
        let result = (self.reg(rs) as i32) < (self.reg(rt) as i32);
        self.set_reg(rd, result as u32);
        Ok(())
    }

    /// SLTU: Set on Less Than Unsigned
    ///
    /// Format: sltu rd, rs, rt
    /// Operation: rd = (rs < rt) ? 1 : 0
    pub(crate) fn op_sltu(&mut self, rs: u8, rt: u8, rd: u8) -> Result<()> {
        let result = self.reg(rs) < self.reg(rt);
        self.set_reg(rd, result as u32);
        Ok(())
    }

    /// SLTI: Set on Less Than Immediate (signed)
    ///
    /// Format: slti rt, rs, imm
    /// Operation: rt = (rs < sign_extend(imm)) ? 1 : 0
    pub(crate) fn op_slti(&mut self, rs: u8, rt: u8, imm: u16) -> Result<()> {
        let result = (self.reg(rs) as i32) < (sign_extend(imm) as i32);
        self.set_reg(rt, result as u32);
        Ok(())
    }

    /// SLTIU: Set on Less Than Immediate Unsigned
    ///
    /// The immediate is sign-extended and then compared unsigned.
    ///
    /// Format: sltiu rt, rs, imm
    /// Operation: rt = (rs < sign_extend(imm)) ? 1 : 0
    pub(crate) fn op_sltiu(&mut self, rs: u8, rt: u8, imm: u16) -> Result<()> {
        let result = self.reg(rs) < sign_extend(imm);
        self.set_reg(rt, result as u32);
        Ok(())
    }
}
