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

//! Multiply/divide unit
//!
//! Division never traps on this CPU. Division by zero and `i32::MIN / -1`
//! produce fixed HI/LO patterns instead.

use super::super::CPU;
use crate::core::error::Result;

/// Signed division, returning (lo, hi)
#[inline]
fn divide_signed(numerator: i32, denominator: i32) -> (u32, u32) {
    if denominator == 0 {
        let lo = if numerator >= 0 { 0xFFFF_FFFF } else { 1 };
        (lo, numerator as u32)
    } else if numerator == i32::MIN && denominator == -1 {
        (0x8000_0000, 0)
    } else {
        ((numerator / denominator) as u32, (numerator % denominator) as u32)
    }
}

/// Unsigned division, returning (lo, hi)
#[inline]
fn divide_unsigned(numerator: u32, denominator: u32) -> (u32, u32) {
    if denominator == 0 {
        (0xFFFF_FFFF, numerator)
    } else {
        (numerator / denominator, numerator % denominator)
    }
}

impl CPU {
    // === Multiply/Divide Instructions ===

    /// MULT: Multiply (signed)
    ///
    /// Format: mult rs, rt
    /// Operation: HI:LO = rs * rt (64-bit signed product)
    pub(crate) fn op_mult(&mut self, rs: u8, rt: u8) -> Result<()> {
        let a = self.reg(rs) as i32 as i64;
        let b = self.reg(rt) as i32 as i64;
        let result = (a * b) as u64;

        self.regs.set_lo(result as u32);
        self.regs.set_hi((result >> 32) as u32);
        Ok(())
    }

    /// MULTU: Multiply Unsigned
    ///
    /// Format: multu rs, rt
    /// Operation: HI:LO = rs * rt (64-bit unsigned product)
    pub(crate) fn op_multu(&mut self, rs: u8, rt: u8) -> Result<()> {
        let result = self.reg(rs) as u64 * self.reg(rt) as u64;

        self.regs.set_lo(result as u32);
        self.regs.set_hi((result >> 32) as u32);
        Ok(())
    }

    /// DIV: Divide (signed)
    ///
    /// Format: div rs, rt
    /// Operation: LO = rs / rt, HI = rs % rt
    ///
    /// | rs          | rt   | LO                         | HI |
    /// |-------------|------|----------------------------|----|
    /// | >= 0        | 0    | 0xFFFFFFFF                 | rs |
    /// | < 0         | 0    | 0x00000001                 | rs |
    /// | 0x80000000  | -1   | 0x80000000                 | 0  |
    pub(crate) fn op_div(&mut self, rs: u8, rt: u8) -> Result<()> {
        let (lo, hi) = divide_signed(self.reg(rs) as i32, self.reg(rt) as i32);
        self.regs.set_lo(lo);
        self.regs.set_hi(hi);
        Ok(())
    }

    /// DIVU: Divide Unsigned
    ///
    /// Format: divu rs, rt
    /// Operation: LO = rs / rt, HI = rs % rt; rt = 0 gives LO = 0xFFFFFFFF, HI = rs
    pub(crate) fn op_divu(&mut self, rs: u8, rt: u8) -> Result<()> {
        let (lo, hi) = divide_unsigned(self.reg(rs), self.reg(rt));
        self.regs.set_lo(lo);
        self.regs.set_hi(hi);
        Ok(())
    }

    /// MFHI: rd = HI
    pub(crate) fn op_mfhi(&mut self, rd: u8) -> Result<()> {
        self.set_reg(rd, self.regs.hi());
        Ok(())
    }

    /// MFLO: rd = LO
    pub(crate) fn op_mflo(&mut self, rd: u8) -> Result<()> {
        self.set_reg(rd, self.regs.lo());
        Ok(())
    }

    /// MTHI: HI = rs
    pub(crate) fn op_mthi(&mut self, rs: u8) -> Result<()> {
        self.regs.set_hi(self.reg(rs));
        Ok(())
    }

    /// MTLO: LO = rs
    pub(crate) fn op_mtlo(&mut self, rs: u8) -> Result<()> {
        self.regs.set_lo(self.reg(rs));
        Ok(())
    }
}
