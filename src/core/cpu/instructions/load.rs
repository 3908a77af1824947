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
use crate::core::memory::Bus;

impl CPU {
    // === Load Instructions ===
    //
    // Every load goes through the load delay latch: the value is visible to
    // the instruction after next.

    /// Effective address: rs + sign_extend(offset)
    #[inline(always)]
    pub(in crate::core::cpu) fn effective_address(&self, rs: u8, imm: u16) -> u32 {
        self.reg(rs).wrapping_add(sign_extend(imm))
    }

    /// Raise an alignment fault for `address` if it is not `size`-aligned
    ///
    /// # Returns
    ///
    /// true if the access may proceed
    pub(in crate::core::cpu) fn check_alignment(
        &mut self,
        address: u32,
        size: u32,
        cause: ExceptionCause,
    ) -> bool {
        if address & (size - 1) != 0 {
            self.cop0.set_bad_vaddr(address);
            self.exception(cause);
            false
        } else {
            true
        }
    }

    /// LW: Load Word (32-bit)
    ///
    /// Format: lw rt, offset(rs)
    /// Operation: rt = memory[rs + sign_extend(offset)]
    ///
    /// # Returns
    ///
    /// Ok(()) on success, AddressErrorLoad is raised on misalignment
    pub(crate) fn op_lw(&mut self, rs: u8, rt: u8, imm: u16, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(rs, imm);
        if !self.check_alignment(addr, 4, ExceptionCause::AddressErrorLoad) {
            return Ok(());
        }

        let value = bus.read32(addr)?;
        self.set_reg_delayed(rt, value);
        Ok(())
    }

    /// LH: Load Halfword (16-bit, sign-extended)
    ///
    /// Format: lh rt, offset(rs)
    pub(crate) fn op_lh(&mut self, rs: u8, rt: u8, imm: u16, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(rs, imm);
        if !self.check_alignment(addr, 2, ExceptionCause::AddressErrorLoad) {
            return Ok(());
        }

        let value = bus.read16(addr)? as i16 as i32 as u32;
        self.set_reg_delayed(rt, value);
        Ok(())
    }

    /// LHU: Load Halfword Unsigned (16-bit, zero-extended)
    ///
    /// Format: lhu rt, offset(rs)
    pub(crate) fn op_lhu(&mut self, rs: u8, rt: u8, imm: u16, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(rs, imm);
        if !self.check_alignment(addr, 2, ExceptionCause::AddressErrorLoad) {
            return Ok(());
        }

        let value = bus.read16(addr)? as u32;
        self.set_reg_delayed(rt, value);
        Ok(())
    }

    /// LB: Load Byte (8-bit, sign-extended)
    ///
    /// Format: lb rt, offset(rs)
    pub(crate) fn op_lb(&mut self, rs: u8, rt: u8, imm: u16, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(rs, imm);
        let value = bus.read8(addr)? as i8 as i32 as u32;
        self.set_reg_delayed(rt, value);
        Ok(())
    }

    /// LBU: Load Byte Unsigned (8-bit, zero-extended)
    ///
    /// Format: lbu rt, offset(rs)
    pub(crate) fn op_lbu(&mut self, rs: u8, rt: u8, imm: u16, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(rs, imm);
        let value = bus.read8(addr)? as u32;
        self.set_reg_delayed(rt, value);
        Ok(())
    }

    /// LWL: Load Word Left
    ///
    /// Loads the high-order bytes of an unaligned word into the high-order
    /// bytes of rt. Paired with LWR to assemble a full unaligned word.
    ///
    /// Format: lwl rt, offset(rs)
    ///
    /// | addr & 3 | result                            |
    /// |----------|-----------------------------------|
    /// | 0        | (rt & 0x00FFFFFF) \| (word << 24) |
    /// | 1        | (rt & 0x0000FFFF) \| (word << 16) |
    /// | 2        | (rt & 0x000000FF) \| (word << 8)  |
    /// | 3        | word                              |
    ///
    /// If the previous instruction was a load into rt, the merge uses that
    /// in-flight value.
    pub(crate) fn op_lwl(&mut self, rs: u8, rt: u8, imm: u16, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(rs, imm);
        let word = bus.read32(addr & !0x3)?;
        let current = self.merge_base(rt);

        let value = match addr & 0x3 {
            0 => (current & 0x00FF_FFFF) | (word << 24),
            1 => (current & 0x0000_FFFF) | (word << 16),
            2 => (current & 0x0000_00FF) | (word << 8),
            _ => word,
        };

        self.set_reg_delayed(rt, value);
        Ok(())
    }

    /// LWR: Load Word Right
    ///
    /// Format: lwr rt, offset(rs)
    ///
    /// | addr & 3 | result                            |
    /// |----------|-----------------------------------|
    /// | 0        | word                              |
    /// | 1        | (rt & 0xFF000000) \| (word >> 8)  |
    /// | 2        | (rt & 0xFFFF0000) \| (word >> 16) |
    /// | 3        | (rt & 0xFFFFFF00) \| (word >> 24) |
    pub(crate) fn op_lwr(&mut self, rs: u8, rt: u8, imm: u16, bus: &mut Bus) -> Result<()> {
        let addr = self.effective_address(rs, imm);
        let word = bus.read32(addr & !0x3)?;
        let current = self.merge_base(rt);

        let value = match addr & 0x3 {
            0 => word,
            1 => (current & 0xFF00_0000) | (word >> 8),
            2 => (current & 0xFFFF_0000) | (word >> 16),
            _ => (current & 0xFFFF_FF00) | (word >> 24),
        };

        self.set_reg_delayed(rt, value);
        Ok(())
    }

    /// Value LWL/LWR merge into: the in-flight load for rt, else rt itself
    fn merge_base(&self, rt: u8) -> u32 {
        self.regs
            .pending_load_value(rt)
            .unwrap_or_else(|| self.reg(rt))
    }
}
